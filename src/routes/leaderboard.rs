use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_valid::Valid;

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse, PlayerBestResponse},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Read-only leaderboard routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/leaderboard/players/{name}", get(player_best))
}

/// Ranked scores with the podium split out.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked leaderboard", body = LeaderboardResponse),
        (status = 400, description = "Invalid limit"),
        (status = 503, description = "No score store could be read")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Valid(Query(query)): Valid<Query<LeaderboardQuery>>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let response = leaderboard_service::leaderboard(&state, query.limit).await?;
    Ok(Json(response))
}

/// Personal best of one player.
#[utoipa::path(
    get,
    path = "/leaderboard/players/{name}",
    tag = "leaderboard",
    params(("name" = String, Path, description = "Player name")),
    responses(
        (status = 200, description = "Best attempt", body = PlayerBestResponse),
        (status = 404, description = "No score recorded for this player")
    )
)]
pub async fn player_best(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerBestResponse>, AppError> {
    let response = leaderboard_service::player_best(&state, &name).await?;
    Ok(Json(response))
}
