//! Fetch a question set and translate it once, failing closed on any error or timeout.

use std::collections::HashMap;

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::{
    clients::{error::ClientResult, translate::Translator, trivia::TriviaQuestion},
    state::{
        SharedState,
        quiz::{LoadFailure, Question},
    },
};

/// Texts of one question after translation, before options are shuffled.
struct TranslatedQuestion {
    prompt: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

/// Memoises translations so every distinct text is sent to the translator once per load.
struct TranslationCache<'a> {
    translator: &'a dyn Translator,
    translated: HashMap<String, String>,
}

impl<'a> TranslationCache<'a> {
    fn new(translator: &'a dyn Translator) -> Self {
        Self {
            translator,
            translated: HashMap::new(),
        }
    }

    async fn get(&mut self, text: &str) -> ClientResult<String> {
        if let Some(hit) = self.translated.get(text) {
            return Ok(hit.clone());
        }

        let translated = self.translator.translate(text.to_string()).await?;
        self.translated.insert(text.to_string(), translated.clone());
        Ok(translated)
    }

    async fn question(&mut self, raw: TriviaQuestion) -> ClientResult<TranslatedQuestion> {
        let prompt = self.get(&raw.question).await?;
        let correct_answer = self.get(&raw.correct_answer).await?;
        let mut incorrect_answers = Vec::with_capacity(raw.incorrect_answers.len());
        for answer in &raw.incorrect_answers {
            incorrect_answers.push(self.get(answer).await?);
        }

        Ok(TranslatedQuestion {
            prompt,
            correct_answer,
            incorrect_answers,
        })
    }
}

/// Load and translate a fresh question set for a new or restarted session.
///
/// Fetch errors, translation errors and the overall load timeout all surface as
/// [`LoadFailure::Unavailable`]; an answer with no usable question is [`LoadFailure::Empty`].
pub async fn load_questions(state: &SharedState) -> Result<Vec<Question>, LoadFailure> {
    let limit = state.config().question_limit;
    let load_timeout = state.config().load_timeout;

    let translated = match timeout(load_timeout, fetch_and_translate(state, limit)).await {
        Ok(Ok(translated)) => translated,
        Ok(Err(err)) => {
            warn!(error = %err, "failed to load trivia questions");
            return Err(LoadFailure::Unavailable(err.to_string()));
        }
        Err(_) => {
            warn!(timeout = ?load_timeout, "loading trivia questions timed out");
            return Err(LoadFailure::Unavailable("operation timed out".into()));
        }
    };

    let questions = build_questions(translated);
    if questions.is_empty() {
        warn!("trivia source returned no usable question");
        return Err(LoadFailure::Empty);
    }

    debug!(count = questions.len(), "loaded trivia questions");
    Ok(questions)
}

async fn fetch_and_translate(
    state: &SharedState,
    limit: usize,
) -> ClientResult<Vec<TranslatedQuestion>> {
    let raw_questions = state.question_source().fetch(limit).await?;

    let translator = state.translator();
    let mut cache = TranslationCache::new(&*translator);
    let mut translated = Vec::with_capacity(raw_questions.len());
    for raw in raw_questions {
        translated.push(cache.question(raw).await?);
    }

    Ok(translated)
}

fn build_questions(translated: Vec<TranslatedQuestion>) -> Vec<Question> {
    let mut rng = rand::rng();
    translated
        .into_iter()
        .filter_map(|question| {
            let prompt = question.prompt.clone();
            Question::new(
                question.prompt,
                question.correct_answer,
                question.incorrect_answers,
                &mut rng,
            )
            .map_err(|err| warn!(prompt = %prompt, error = %err, "skipping unusable question"))
            .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        clients::{
            error::ClientError, translate::PassthroughTranslator, trivia::QuestionSource,
        },
        config::AppConfig,
        dao::score_store::memory::MemoryScoreStore,
        state::{
            AppState,
            tests::{StaticQuestionSource, test_state, trivia_batch},
        },
    };

    /// Prefixes every text and records what it was asked to translate.
    #[derive(Default)]
    struct RecordingTranslator {
        calls: Arc<Mutex<Vec<String>>>,
        fail: AtomicBool,
    }

    impl Translator for RecordingTranslator {
        fn translate(&self, text: String) -> BoxFuture<'static, ClientResult<String>> {
            self.calls.lock().unwrap().push(text.clone());
            let fail = self.fail.load(Ordering::SeqCst);
            Box::pin(async move {
                if fail {
                    Err(ClientError::MalformedTranslation { text })
                } else {
                    Ok(format!("es:{text}"))
                }
            })
        }
    }

    struct SlowSource;

    impl QuestionSource for SlowSource {
        fn fetch(&self, _limit: usize) -> BoxFuture<'static, ClientResult<Vec<TriviaQuestion>>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            })
        }
    }

    fn state_with(
        questions: Option<Vec<TriviaQuestion>>,
        translator: Arc<dyn Translator>,
    ) -> SharedState {
        AppState::new(
            AppConfig::default(),
            Arc::new(StaticQuestionSource { questions }),
            translator,
            Arc::new(MemoryScoreStore::new()),
        )
    }

    #[tokio::test]
    async fn loads_requested_number_of_questions() {
        let state = test_state(Some(trivia_batch(8)));
        let questions = load_questions(&state).await.unwrap();

        assert_eq!(questions.len(), state.config().question_limit);
        assert_eq!(questions[0].prompt(), "Question 0?");
        assert_eq!(questions[0].correct_answer(), "right 0");
        assert_eq!(questions[0].options().len(), 3);
    }

    #[tokio::test]
    async fn translates_each_distinct_text_once() {
        let translator = Arc::new(RecordingTranslator::default());
        let calls = translator.calls.clone();
        let batch = vec![
            TriviaQuestion {
                question: "Which is true?".into(),
                correct_answer: "True".into(),
                incorrect_answers: vec!["False".into()],
            },
            TriviaQuestion {
                question: "Is water wet?".into(),
                correct_answer: "True".into(),
                incorrect_answers: vec!["False".into()],
            },
        ];
        let state = state_with(Some(batch), translator);

        let questions = load_questions(&state).await.unwrap();
        assert_eq!(questions[1].prompt(), "es:Is water wet?");
        assert_eq!(questions[1].correct_answer(), "es:True");

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec!["Which is true?", "True", "False", "Is water wet?"]
        );
    }

    #[tokio::test]
    async fn fetch_failure_is_unavailable() {
        let state = test_state(None);
        let err = load_questions(&state).await.unwrap_err();
        assert!(matches!(err, LoadFailure::Unavailable(_)));
    }

    #[tokio::test]
    async fn translation_failure_is_unavailable() {
        let translator = Arc::new(RecordingTranslator::default());
        translator.fail.store(true, Ordering::SeqCst);
        let state = state_with(Some(trivia_batch(2)), translator);

        let err = load_questions(&state).await.unwrap_err();
        assert!(matches!(err, LoadFailure::Unavailable(_)));
    }

    #[tokio::test]
    async fn empty_batch_is_empty_failure() {
        let state = test_state(Some(Vec::new()));
        assert_eq!(load_questions(&state).await.unwrap_err(), LoadFailure::Empty);
    }

    #[tokio::test]
    async fn unusable_questions_are_skipped() {
        let mut batch = trivia_batch(2);
        batch[0].incorrect_answers = vec![batch[0].correct_answer.clone()];
        let state = test_state(Some(batch));

        let questions = load_questions(&state).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt(), "Question 1?");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_times_out() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(SlowSource),
            Arc::new(PassthroughTranslator),
            Arc::new(MemoryScoreStore::new()),
        );

        let err = load_questions(&state).await.unwrap_err();
        assert_eq!(
            err,
            LoadFailure::Unavailable("operation timed out".into())
        );
    }
}
