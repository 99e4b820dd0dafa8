use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dto::{format_timestamp, validation::validate_player_name},
    state::leaderboard::{RankedEntry, ScoreEntry},
};

/// Optional override of the name recorded on the leaderboard.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct SaveScoreRequest {
    /// Defaults to the name the session was started with.
    #[serde(default)]
    #[validate(custom(function = "validate_player_name"))]
    pub player_name: Option<String>,
}

/// Query string accepted by the leaderboard listing.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Maximum number of rows; defaults to the configured limit.
    #[validate(range(min = 1))]
    pub limit: Option<usize>,
}

/// A recorded score.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreEntryDto {
    /// Player name as recorded.
    pub player_name: String,
    /// Correct answers.
    pub score: u32,
    /// Seconds spent on the quiz.
    pub duration_seconds: Option<f64>,
    /// RFC 3339 timestamp (UTC).
    pub submitted_at: String,
}

impl From<&ScoreEntry> for ScoreEntryDto {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            player_name: entry.player_name.clone(),
            score: entry.score,
            duration_seconds: entry.duration_seconds,
            submitted_at: format_timestamp(entry.submitted_at),
        }
    }
}

/// A score with its dense rank.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedEntryDto {
    /// Dense rank; equal scores share a rank.
    pub rank: u32,
    /// The ranked score.
    #[serde(flatten)]
    pub entry: ScoreEntryDto,
}

impl From<&RankedEntry> for RankedEntryDto {
    fn from(ranked: &RankedEntry) -> Self {
        Self {
            rank: ranked.rank,
            entry: ScoreEntryDto::from(&ranked.entry),
        }
    }
}

/// Response after recording a finished session.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct SaveScoreResponse {
    /// The stored entry.
    pub entry: ScoreEntryDto,
    /// Backend that accepted the write.
    pub store: String,
    /// Set when the score went to the local fallback store.
    pub warning: Option<String>,
}

/// Ranked leaderboard with the podium split out.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Up to three top rows, highlighted by clients.
    pub podium: Vec<RankedEntryDto>,
    /// Every ranked row, podium included.
    pub entries: Vec<RankedEntryDto>,
    /// Backend the rows were read from.
    pub store: String,
}

/// Best recorded attempt of one player.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerBestResponse {
    /// Name the lookup matched.
    pub player_name: String,
    /// Number of recorded attempts for this player.
    pub attempts: usize,
    /// Top row of the player's own entries ranked among themselves.
    pub best: RankedEntryDto,
}
