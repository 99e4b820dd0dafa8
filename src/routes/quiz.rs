use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        leaderboard::{SaveScoreRequest, SaveScoreResponse},
        quiz::{QuizView, StartQuizRequest, SubmitAnswerRequest},
    },
    error::AppError,
    services::{leaderboard_service, quiz_service},
    state::SharedState,
};

/// Routes driving a quiz session from name entry to the saved score.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/quiz", post(start_quiz))
        .route("/quiz/{id}", get(get_quiz).delete(discard))
        .route("/quiz/{id}/answer", post(submit_answer))
        .route("/quiz/{id}/next", post(advance))
        .route("/quiz/{id}/restart", post(restart))
        .route("/quiz/{id}/score", post(save_score))
}

/// Load a fresh question set and open a session.
#[utoipa::path(
    post,
    path = "/quiz",
    tag = "quiz",
    request_body = StartQuizRequest,
    responses(
        (status = 201, description = "Quiz started", body = QuizView),
        (status = 400, description = "Invalid player name"),
        (status = 503, description = "Questions could not be loaded")
    )
)]
pub async fn start_quiz(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<StartQuizRequest>>,
) -> Result<(StatusCode, Json<QuizView>), AppError> {
    let view = quiz_service::start_quiz(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Current state of a session.
#[utoipa::path(
    get,
    path = "/quiz/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz session identifier")),
    responses(
        (status = 200, description = "Quiz state", body = QuizView),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_quiz(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    let view = quiz_service::get_quiz(&state, id)?;
    Ok(Json(view))
}

/// Answer the question on screen.
#[utoipa::path(
    post,
    path = "/quiz/{id}/answer",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz session identifier")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = QuizView),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "The session is not waiting for an answer")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<QuizView>, AppError> {
    let view = quiz_service::submit_answer(&state, id, payload)?;
    Ok(Json(view))
}

/// Move on to the next question or the final result.
#[utoipa::path(
    post,
    path = "/quiz/{id}/next",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz session identifier")),
    responses(
        (status = 200, description = "Moved on", body = QuizView),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "The current question has not been answered")
    )
)]
pub async fn advance(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    let view = quiz_service::advance(&state, id)?;
    Ok(Json(view))
}

/// Start the session over with new questions.
#[utoipa::path(
    post,
    path = "/quiz/{id}/restart",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz session identifier")),
    responses(
        (status = 200, description = "Quiz restarted, possibly in the failed phase", body = QuizView),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn restart(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuizView>, AppError> {
    let view = quiz_service::restart(&state, id).await?;
    Ok(Json(view))
}

/// Drop a session.
#[utoipa::path(
    delete,
    path = "/quiz/{id}",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz session identifier")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn discard(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    quiz_service::discard(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record the result of a finished session on the leaderboard.
#[utoipa::path(
    post,
    path = "/quiz/{id}/score",
    tag = "quiz",
    params(("id" = Uuid, Path, description = "Quiz session identifier")),
    request_body = SaveScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = SaveScoreResponse),
        (status = 404, description = "Unknown session"),
        (status = 409, description = "Quiz not finished or score already saved"),
        (status = 503, description = "No score store accepted the write")
    )
)]
pub async fn save_score(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SaveScoreRequest>>,
) -> Result<Json<SaveScoreResponse>, AppError> {
    let response = leaderboard_service::save_session_score(&state, id, payload).await?;
    Ok(Json(response))
}
