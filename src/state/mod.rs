/// Leaderboard entries and ranking.
pub mod leaderboard;
/// Quiz session state machine.
pub mod quiz;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    clients::{translate::Translator, trivia::QuestionSource},
    config::AppConfig,
    dao::score_store::ScoreStore,
    state::quiz::QuizSession,
};

/// Handle shared by every request handler and background task.
pub type SharedState = Arc<AppState>;

/// Central application state: live quiz sessions, HTTP collaborators and leaderboard stores.
pub struct AppState {
    config: AppConfig,
    sessions: DashMap<Uuid, QuizSession>,
    question_source: Arc<dyn QuestionSource>,
    translator: Arc<dyn Translator>,
    score_store: RwLock<Option<Arc<dyn ScoreStore>>>,
    fallback_store: Arc<dyn ScoreStore>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// No primary score store is installed yet; the fallback store serves the leaderboard
    /// until one is.
    pub fn new(
        config: AppConfig,
        question_source: Arc<dyn QuestionSource>,
        translator: Arc<dyn Translator>,
        fallback_store: Arc<dyn ScoreStore>,
    ) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(false);
        Arc::new(Self {
            config,
            sessions: DashMap::new(),
            question_source,
            translator,
            score_store: RwLock::new(None),
            fallback_store,
            degraded: degraded_tx,
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Live quiz sessions keyed by their identifier.
    pub fn sessions(&self) -> &DashMap<Uuid, QuizSession> {
        &self.sessions
    }

    /// Trivia question source.
    pub fn question_source(&self) -> Arc<dyn QuestionSource> {
        self.question_source.clone()
    }

    /// Translation collaborator.
    pub fn translator(&self) -> Arc<dyn Translator> {
        self.translator.clone()
    }

    /// Obtain a handle to the primary score store, if one is installed.
    pub async fn score_store(&self) -> Option<Arc<dyn ScoreStore>> {
        let guard = self.score_store.read().await;
        guard.as_ref().cloned()
    }

    /// Local store used whenever the primary store is missing or failing.
    pub fn fallback_store(&self) -> Arc<dyn ScoreStore> {
        self.fallback_store.clone()
    }

    /// The single store leaderboard reads are served from: the primary when installed,
    /// otherwise the fallback.
    pub async fn active_score_store(&self) -> Arc<dyn ScoreStore> {
        self.score_store()
            .await
            .unwrap_or_else(|| self.fallback_store())
    }

    /// Install a primary score store and leave degraded mode.
    pub async fn install_score_store(&self, store: Arc<dyn ScoreStore>) {
        {
            let mut guard = self.score_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the primary score store and enter degraded mode.
    pub async fn clear_score_store(&self) {
        {
            let mut guard = self.score_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Declare that a primary store is configured: stay degraded until it is installed.
    pub fn expect_primary_store(&self) {
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use futures::future::BoxFuture;
    use reqwest::StatusCode;

    use super::*;
    use crate::{
        clients::{
            error::{ClientError, ClientResult},
            translate::PassthroughTranslator,
            trivia::TriviaQuestion,
        },
        dao::score_store::memory::MemoryScoreStore,
    };

    /// Question source serving a fixed batch, or failing like an unreachable API.
    pub(crate) struct StaticQuestionSource {
        pub questions: Option<Vec<TriviaQuestion>>,
    }

    impl QuestionSource for StaticQuestionSource {
        fn fetch(&self, limit: usize) -> BoxFuture<'static, ClientResult<Vec<TriviaQuestion>>> {
            let questions = self.questions.clone();
            Box::pin(async move {
                match questions {
                    Some(mut questions) => {
                        questions.truncate(limit);
                        Ok(questions)
                    }
                    None => Err(ClientError::RequestStatus {
                        url: "https://trivia.test/api/questions".into(),
                        status: StatusCode::SERVICE_UNAVAILABLE,
                    }),
                }
            })
        }
    }

    pub(crate) fn trivia_batch(count: usize) -> Vec<TriviaQuestion> {
        (0..count)
            .map(|i| TriviaQuestion {
                question: format!("Question {i}?"),
                correct_answer: format!("right {i}"),
                incorrect_answers: vec![format!("wrong {i}a"), format!("wrong {i}b")],
            })
            .collect()
    }

    pub(crate) fn test_state(questions: Option<Vec<TriviaQuestion>>) -> SharedState {
        AppState::new(
            AppConfig::default(),
            Arc::new(StaticQuestionSource { questions }),
            Arc::new(PassthroughTranslator),
            Arc::new(MemoryScoreStore::new()),
        )
    }

    #[tokio::test]
    async fn fallback_serves_reads_until_primary_is_installed() {
        let state = test_state(Some(Vec::new()));
        assert_eq!(state.active_score_store().await.backend(), "memory");
        assert!(state.score_store().await.is_none());
        assert!(!state.is_degraded());

        state.expect_primary_store();
        assert!(state.is_degraded());

        state
            .install_score_store(Arc::new(MemoryScoreStore::new()))
            .await;
        assert!(state.score_store().await.is_some());
        assert!(!state.is_degraded());

        state.clear_score_store().await;
        assert!(state.score_store().await.is_none());
        assert!(state.is_degraded());
    }
}
