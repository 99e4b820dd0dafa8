use axum::Router;

use crate::state::SharedState;

/// Swagger UI and the raw OpenAPI document.
pub mod docs;
/// Liveness endpoint.
pub mod health;
/// Leaderboard endpoints.
pub mod leaderboard;
/// Quiz session endpoints.
pub mod quiz;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(quiz::router())
        .merge(leaderboard::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
