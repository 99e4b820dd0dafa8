use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::validation::validate_player_name,
    state::quiz::{QuizPhase, QuizSession},
};

/// Label of the button submitting the selected option.
pub const SUBMIT_LABEL: &str = "Responder";
/// Label of the button moving to the next question.
pub const ADVANCE_LABEL: &str = "Siguiente";
/// Label of the button starting the quiz over.
pub const RESTART_LABEL: &str = "Reiniciar Quiz";

/// Payload opening a new quiz session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartQuizRequest {
    /// Name shown on the result screen and the leaderboard.
    #[validate(custom(function = "validate_player_name"))]
    pub player_name: String,
}

/// Payload answering the current question.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Selected option; leaving it out counts as a wrong answer.
    #[serde(default)]
    pub option: Option<String>,
}

/// Phase of a session as exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VisibleQuizPhase {
    /// A question is on screen.
    AwaitingAnswer,
    /// Feedback for the last answer is on screen.
    Answered,
    /// Every question was answered.
    Finished,
    /// No question set could be loaded.
    Failed,
}

impl From<&QuizPhase> for VisibleQuizPhase {
    fn from(phase: &QuizPhase) -> Self {
        match phase {
            QuizPhase::AwaitingAnswer => Self::AwaitingAnswer,
            QuizPhase::Answered => Self::Answered,
            QuizPhase::Finished => Self::Finished,
            QuizPhase::Failed(_) => Self::Failed,
        }
    }
}

/// The question currently on screen.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionView {
    /// Question text, translated.
    pub prompt: String,
    /// Options in the order fixed when the question was built.
    pub options: Vec<String>,
}

/// Outcome of the last answer.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackView {
    /// Whether the selected option was the right one.
    pub is_correct: bool,
    /// Only revealed after a wrong answer.
    pub correct_answer: Option<String>,
    /// Text shown under the question.
    pub message: String,
}

/// Final screen of a finished session.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct ResultView {
    /// Correct answers.
    pub score: u32,
    /// Questions in the session.
    pub total: u32,
    /// More than half of the questions were right.
    pub passed: bool,
    /// Seconds between start and finish.
    pub duration_seconds: Option<f64>,
    /// Congratulation or encouragement, addressed to the player.
    pub message: String,
}

/// Everything a client needs to render a quiz session.
#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizView {
    /// Identifier used in every session route.
    pub session_id: Uuid,
    /// Trimmed player name.
    pub player_name: String,
    /// Current phase.
    pub phase: VisibleQuizPhase,
    /// 1-based number of the question on screen; `0` when the quiz could not start.
    pub question_number: usize,
    /// Questions in the session.
    pub total: usize,
    /// Points credited so far.
    pub score: u32,
    /// Present while a question is on screen.
    pub question: Option<QuestionView>,
    /// Present after an answer.
    pub feedback: Option<FeedbackView>,
    /// Label of the single action available in this phase.
    pub action_label: Option<String>,
    /// Present once the session is finished.
    pub result: Option<ResultView>,
    /// Why the questions could not be loaded.
    pub error: Option<String>,
    /// Whether the result has already been recorded on the leaderboard.
    pub score_saved: bool,
}

impl From<&QuizSession> for QuizView {
    fn from(session: &QuizSession) -> Self {
        let phase = session.phase();

        let question_number = match phase {
            QuizPhase::AwaitingAnswer | QuizPhase::Answered => session.current_index() + 1,
            QuizPhase::Finished => session.total(),
            QuizPhase::Failed(_) => 0,
        };

        let question = match phase {
            QuizPhase::AwaitingAnswer | QuizPhase::Answered => {
                session.current_question().map(|question| QuestionView {
                    prompt: question.prompt().to_string(),
                    options: question.options().to_vec(),
                })
            }
            QuizPhase::Finished | QuizPhase::Failed(_) => None,
        };

        let feedback = match phase {
            QuizPhase::Answered => session.last_feedback().map(|feedback| FeedbackView {
                is_correct: feedback.is_correct,
                correct_answer: feedback.correct_answer.clone(),
                message: feedback.message(),
            }),
            _ => None,
        };

        let action_label = match phase {
            QuizPhase::AwaitingAnswer => SUBMIT_LABEL,
            QuizPhase::Answered => ADVANCE_LABEL,
            QuizPhase::Finished | QuizPhase::Failed(_) => RESTART_LABEL,
        };

        let result = session.result().map(|result| ResultView {
            score: result.score,
            total: result.total,
            passed: result.passed,
            duration_seconds: result.duration_seconds,
            message: result.message(),
        });

        let error = match phase {
            QuizPhase::Failed(failure) => Some(failure.to_string()),
            _ => None,
        };

        Self {
            session_id: session.id(),
            player_name: session.player_name().to_string(),
            phase: phase.into(),
            question_number,
            total: session.total(),
            score: session.score(),
            question,
            feedback,
            action_label: Some(action_label.to_string()),
            result,
            error,
            score_saved: session.score_saved(),
        }
    }
}
