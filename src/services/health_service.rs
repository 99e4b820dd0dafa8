use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report which store serves the leaderboard, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = state.active_score_store().await;
    if let Err(err) = store.health_check().await {
        warn!(backend = store.backend(), error = %err, "score store health check failed");
    }

    if state.is_degraded() {
        HealthResponse::degraded(store.backend())
    } else {
        HealthResponse::ok(store.backend())
    }
}
