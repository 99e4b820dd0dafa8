use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Backend currently serving the leaderboard.
    pub score_store: String,
}

impl HealthResponse {
    /// The configured leaderboard store is in use.
    pub fn ok(score_store: &str) -> Self {
        Self {
            status: "ok".to_string(),
            score_store: score_store.to_string(),
        }
    }

    /// The leaderboard fell back to the local store.
    pub fn degraded(score_store: &str) -> Self {
        Self {
            status: "degraded".to_string(),
            score_store: score_store.to_string(),
        }
    }
}
