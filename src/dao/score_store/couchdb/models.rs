use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::ScoreEntity;

/// Id prefix shared by every score document.
pub const SCORE_PREFIX: &str = "score::";
/// Appended to a prefix to form the inclusive upper bound of an `_all_docs` range.
pub const END_SUFFIX: &str = "\u{ffff}";

/// Body of an `_all_docs?include_docs=true` response.
#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    /// Matching rows in id order.
    pub rows: Vec<AllDocsRow>,
}

/// One `_all_docs` row.
#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    /// Document id.
    pub id: String,
    /// Raw document; absent for deleted entries.
    #[serde(default)]
    pub doc: Option<Value>,
}

/// One leaderboard row. Documents are only ever created, so no revision is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchScoreDocument {
    /// `score::<uuid>`.
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision, only present on documents read back.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Score fields stored at the top level of the document.
    #[serde(flatten)]
    pub score: ScoreBody,
}

/// Stored score fields.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBody {
    /// Entry id, also embedded in the document id.
    pub score_id: Uuid,
    /// Trimmed player name.
    pub player_name: String,
    /// Correct answers.
    pub score: u32,
    /// Time spent on the quiz, when known.
    pub duration_seconds: Option<f64>,
    /// Submission time, RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl From<ScoreEntity> for CouchScoreDocument {
    fn from(entity: ScoreEntity) -> Self {
        Self {
            id: score_doc_id(entity.id),
            rev: None,
            score: ScoreBody {
                score_id: entity.id,
                player_name: entity.player_name,
                score: entity.score,
                duration_seconds: entity.duration_seconds,
                submitted_at: entity.submitted_at,
            },
        }
    }
}

impl From<CouchScoreDocument> for ScoreEntity {
    fn from(doc: CouchScoreDocument) -> Self {
        ScoreEntity {
            id: doc.score.score_id,
            player_name: doc.score.player_name,
            score: doc.score.score,
            duration_seconds: doc.score.duration_seconds,
            submitted_at: doc.score.submitted_at,
        }
    }
}

/// Document id for a score entry.
pub fn score_doc_id(id: Uuid) -> String {
    format!("{SCORE_PREFIX}{id}")
}
