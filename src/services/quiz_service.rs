//! Quiz session handlers: each player action maps to exactly one state-machine transition.

use dashmap::mapref::one::RefMut;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::quiz::{QuizView, StartQuizRequest, SubmitAnswerRequest},
    error::ServiceError,
    services::question_service,
    state::{
        SharedState,
        quiz::{QuizPhase, QuizSession},
    },
};

/// Load a question set and open a new session for the player.
///
/// Nothing is registered when the questions cannot be loaded.
pub async fn start_quiz(
    state: &SharedState,
    request: StartQuizRequest,
) -> Result<QuizView, ServiceError> {
    let player_name = request.player_name.trim().to_string();
    if player_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be empty".into(),
        ));
    }

    let questions = question_service::load_questions(state)
        .await
        .map_err(ServiceError::QuestionsUnavailable)?;

    let session = QuizSession::start(player_name, Ok(questions));
    let view = QuizView::from(&session);
    info!(
        session_id = %session.id(),
        player = %session.player_name(),
        total = session.total(),
        "quiz session started"
    );
    state.sessions().insert(session.id(), session);

    Ok(view)
}

/// Render the current state of a session.
pub fn get_quiz(state: &SharedState, id: Uuid) -> Result<QuizView, ServiceError> {
    let session = state
        .sessions()
        .get(&id)
        .ok_or_else(|| session_not_found(id))?;
    Ok(QuizView::from(&*session))
}

/// Answer the current question. A missing option counts as a wrong answer.
pub fn submit_answer(
    state: &SharedState,
    id: Uuid,
    request: SubmitAnswerRequest,
) -> Result<QuizView, ServiceError> {
    let mut session = session_mut(state, id)?;
    let selected = request.option.unwrap_or_default();

    let is_correct = session.submit_answer(&selected)?.is_correct;
    debug!(
        session_id = %id,
        question = session.current_index() + 1,
        is_correct,
        score = session.score(),
        "answer submitted"
    );

    Ok(QuizView::from(&*session))
}

/// Leave the feedback screen for the next question or the final result.
pub fn advance(state: &SharedState, id: Uuid) -> Result<QuizView, ServiceError> {
    let mut session = session_mut(state, id)?;

    if *session.advance()? == QuizPhase::Finished {
        info!(
            session_id = %id,
            score = session.score(),
            total = session.total(),
            "quiz session finished"
        );
    }

    Ok(QuizView::from(&*session))
}

/// Start the session over with a freshly loaded question set.
///
/// A failed load leaves the session in the failed phase; the view carries the reason.
pub async fn restart(state: &SharedState, id: Uuid) -> Result<QuizView, ServiceError> {
    if !state.sessions().contains_key(&id) {
        return Err(session_not_found(id));
    }

    let loaded = question_service::load_questions(state).await;

    let mut session = session_mut(state, id)?;
    session.reset(loaded);
    info!(session_id = %id, phase = ?session.phase(), "quiz session restarted");

    Ok(QuizView::from(&*session))
}

/// Drop a session for good.
pub fn discard(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    state
        .sessions()
        .remove(&id)
        .map(|_| debug!(session_id = %id, "quiz session discarded"))
        .ok_or_else(|| session_not_found(id))
}

fn session_mut(
    state: &SharedState,
    id: Uuid,
) -> Result<RefMut<'_, Uuid, QuizSession>, ServiceError> {
    state
        .sessions()
        .get_mut(&id)
        .ok_or_else(|| session_not_found(id))
}

fn session_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("quiz session `{id}` not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::quiz::{ADVANCE_LABEL, RESTART_LABEL, SUBMIT_LABEL, VisibleQuizPhase},
        state::tests::{test_state, trivia_batch},
    };

    fn start_request(name: &str) -> StartQuizRequest {
        StartQuizRequest {
            player_name: name.into(),
        }
    }

    fn answer(option: &str) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            option: Some(option.into()),
        }
    }

    #[tokio::test]
    async fn perfect_run_ends_with_pass_message() {
        let state = test_state(Some(trivia_batch(5)));
        let view = start_quiz(&state, start_request("  Ana ")).await.unwrap();
        let id = view.session_id;

        assert_eq!(view.player_name, "Ana");
        assert_eq!(view.phase, VisibleQuizPhase::AwaitingAnswer);
        assert_eq!(view.action_label.as_deref(), Some(SUBMIT_LABEL));
        assert_eq!(view.total, 5);

        for i in 0..5 {
            let view = submit_answer(&state, id, answer(&format!("right {i}"))).unwrap();
            assert_eq!(view.phase, VisibleQuizPhase::Answered);
            assert_eq!(view.action_label.as_deref(), Some(ADVANCE_LABEL));
            assert!(view.feedback.unwrap().is_correct);
            advance(&state, id).unwrap();
        }

        let view = get_quiz(&state, id).unwrap();
        assert_eq!(view.phase, VisibleQuizPhase::Finished);
        assert_eq!(view.action_label.as_deref(), Some(RESTART_LABEL));
        assert!(view.question.is_none());
        let result = view.result.unwrap();
        assert_eq!((result.score, result.total), (5, 5));
        assert!(result.passed);
        assert_eq!(result.message, "🎉 Ana, acertaste 5/5. ¡Buen trabajo!");
    }

    #[tokio::test]
    async fn failed_fetch_creates_no_session() {
        let state = test_state(None);
        let err = start_quiz(&state, start_request("Ana")).await.unwrap_err();
        assert!(matches!(err, ServiceError::QuestionsUnavailable(_)));
        assert!(state.sessions().is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let state = test_state(Some(trivia_batch(5)));
        let err = start_quiz(&state, start_request("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn double_submit_is_a_conflict_and_keeps_score() {
        let state = test_state(Some(trivia_batch(5)));
        let id = start_quiz(&state, start_request("Ana"))
            .await
            .unwrap()
            .session_id;

        submit_answer(&state, id, answer("right 0")).unwrap();
        let err = submit_answer(&state, id, answer("right 0")).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(get_quiz(&state, id).unwrap().score, 0);

        assert_eq!(advance(&state, id).unwrap().score, 1);
    }

    #[tokio::test]
    async fn missing_option_is_wrong_answer() {
        let state = test_state(Some(trivia_batch(5)));
        let id = start_quiz(&state, start_request("Ana"))
            .await
            .unwrap()
            .session_id;

        let view = submit_answer(&state, id, SubmitAnswerRequest { option: None }).unwrap();
        let feedback = view.feedback.unwrap();
        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct_answer.as_deref(), Some("right 0"));
        assert_eq!(view.score, 0);
    }

    #[tokio::test]
    async fn advance_before_answer_is_a_conflict() {
        let state = test_state(Some(trivia_batch(5)));
        let id = start_quiz(&state, start_request("Ana"))
            .await
            .unwrap()
            .session_id;
        assert!(matches!(
            advance(&state, id).unwrap_err(),
            ServiceError::InvalidState(_)
        ));
    }

    #[tokio::test]
    async fn restart_reloads_questions() {
        let state = test_state(Some(trivia_batch(5)));
        let id = start_quiz(&state, start_request("Ana"))
            .await
            .unwrap()
            .session_id;
        submit_answer(&state, id, answer("right 0")).unwrap();

        let view = restart(&state, id).await.unwrap();
        assert_eq!(view.phase, VisibleQuizPhase::AwaitingAnswer);
        assert_eq!(view.score, 0);
        assert_eq!(view.question_number, 1);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let state = test_state(Some(trivia_batch(5)));
        let id = Uuid::new_v4();
        assert!(matches!(
            get_quiz(&state, id).unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            restart(&state, id).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            discard(&state, id).unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn discard_removes_session() {
        let state = test_state(Some(trivia_batch(5)));
        let id = start_quiz(&state, start_request("Ana"))
            .await
            .unwrap()
            .session_id;
        discard(&state, id).unwrap();
        assert!(state.sessions().get(&id).is_none());
    }
}
