use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the quiz backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::quiz::start_quiz,
        crate::routes::quiz::get_quiz,
        crate::routes::quiz::submit_answer,
        crate::routes::quiz::advance,
        crate::routes::quiz::restart,
        crate::routes::quiz::discard,
        crate::routes::quiz::save_score,
        crate::routes::leaderboard::leaderboard,
        crate::routes::leaderboard::player_best,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::quiz::StartQuizRequest,
            crate::dto::quiz::SubmitAnswerRequest,
            crate::dto::quiz::QuizView,
            crate::dto::quiz::VisibleQuizPhase,
            crate::dto::quiz::QuestionView,
            crate::dto::quiz::FeedbackView,
            crate::dto::quiz::ResultView,
            crate::dto::leaderboard::SaveScoreRequest,
            crate::dto::leaderboard::SaveScoreResponse,
            crate::dto::leaderboard::ScoreEntryDto,
            crate::dto::leaderboard::RankedEntryDto,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::PlayerBestResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "quiz", description = "Quiz sessions driven one action at a time"),
        (name = "leaderboard", description = "Ranked scores of finished quizzes"),
    )
)]
pub struct ApiDoc;
