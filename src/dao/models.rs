use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::leaderboard::ScoreEntry;

/// Leaderboard row persisted by the storage layer.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreEntity {
    /// Stable identifier of the row, used as document key by remote stores.
    pub id: Uuid,
    /// Trimmed player name.
    pub player_name: String,
    /// Number of correct answers.
    pub score: u32,
    /// Seconds spent on the quiz, when known.
    pub duration_seconds: Option<f64>,
    /// Submission time, stored as RFC 3339 UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

impl From<ScoreEntry> for ScoreEntity {
    fn from(entry: ScoreEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_name: entry.player_name,
            score: entry.score,
            duration_seconds: entry.duration_seconds,
            submitted_at: entry.submitted_at,
        }
    }
}

impl From<ScoreEntity> for ScoreEntry {
    fn from(entity: ScoreEntity) -> Self {
        Self {
            player_name: entity.player_name,
            score: entity.score,
            duration_seconds: entity.duration_seconds,
            submitted_at: entity.submitted_at,
        }
    }
}
