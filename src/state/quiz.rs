use std::{collections::HashSet, time::Duration};

use rand::{Rng, seq::SliceRandom};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::time::Instant;
use uuid::Uuid;

/// Feedback shown after a correct answer.
pub const CORRECT_MESSAGE: &str = "✅ ¡Correcto!";

/// A translated multiple-choice question with its options shuffled once at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    correct_answer: String,
    options: Vec<String>,
}

/// Reasons why a question cannot be built from the fetched data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidQuestion {
    /// The prompt is blank.
    #[error("question prompt is empty")]
    EmptyPrompt,
    /// Fewer than two distinct options remain once duplicates are removed.
    #[error("question needs at least two distinct options (got {0})")]
    TooFewOptions(usize),
}

impl Question {
    /// Build a question from its translated texts.
    ///
    /// Options are the incorrect answers plus the correct one, with duplicates removed, shuffled
    /// with `rng`. The resulting order is kept for the whole lifetime of the question.
    pub fn new<R: Rng + ?Sized>(
        prompt: String,
        correct_answer: String,
        incorrect_answers: Vec<String>,
        rng: &mut R,
    ) -> Result<Self, InvalidQuestion> {
        if prompt.trim().is_empty() {
            return Err(InvalidQuestion::EmptyPrompt);
        }

        let mut seen = HashSet::new();
        let mut options: Vec<String> = incorrect_answers
            .into_iter()
            .chain(std::iter::once(correct_answer.clone()))
            .filter(|option| seen.insert(option.clone()))
            .collect();

        if options.len() < 2 {
            return Err(InvalidQuestion::TooFewOptions(options.len()));
        }

        options.shuffle(rng);

        Ok(Self {
            prompt,
            correct_answer,
            options,
        })
    }

    /// Question text shown to the player.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The memoised translation of the correct answer.
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Options in display order.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Exact, case-sensitive comparison against the correct answer.
    pub fn is_correct(&self, selected: &str) -> bool {
        self.correct_answer == selected
    }
}

/// Why a session could not enter the question loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    /// The source answered but no usable question came back.
    #[error("no questions available")]
    Empty,
    /// Fetching or translating failed (including timeouts).
    #[error("failed to load questions: {0}")]
    Unavailable(String),
}

/// Phases a quiz session can be in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    /// The current question is shown and no answer has been submitted yet.
    AwaitingAnswer,
    /// Feedback for the current question is shown; waiting for the player to advance.
    Answered,
    /// Every question has been answered; score and count are final.
    Finished,
    /// Questions could not be loaded; the session never entered the question loop.
    Failed(LoadFailure),
}

/// Player actions driving the per-question loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    /// Submit an answer for the current question.
    SubmitAnswer,
    /// Move on after the feedback has been shown.
    Advance,
}

/// Error returned when an event is not valid in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase the session was in when the event was received.
    pub from: QuizPhase,
    /// The rejected event.
    pub event: QuizEvent,
}

/// Outcome of the last submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Whether the selected option matched the correct answer.
    pub is_correct: bool,
    /// The correct answer, present only when the selection was wrong.
    pub correct_answer: Option<String>,
}

impl Feedback {
    /// Message displayed under the question.
    pub fn message(&self) -> String {
        match &self.correct_answer {
            Some(correct) if !self.is_correct => {
                format!("❌ Incorrecto. La respuesta correcta era: {correct}")
            }
            _ => CORRECT_MESSAGE.to_string(),
        }
    }
}

/// Final tally of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    /// Name the player entered at the start.
    pub player_name: String,
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions in the session.
    pub total: u32,
    /// `true` when more than half of the questions were answered correctly.
    pub passed: bool,
    /// Seconds elapsed between the start and the last advance.
    pub duration_seconds: Option<f64>,
}

impl QuizResult {
    /// Closing message for the final screen.
    pub fn message(&self) -> String {
        if self.passed {
            format!(
                "🎉 {}, acertaste {}/{}. ¡Buen trabajo!",
                self.player_name, self.score, self.total
            )
        } else {
            format!(
                "❌ {}, solo acertaste {}/{}. ¡Sigue practicando!",
                self.player_name, self.score, self.total
            )
        }
    }
}

/// One player's attempt at a quiz, from name entry to the final score.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    player_name: String,
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    phase: QuizPhase,
    last_feedback: Option<Feedback>,
    started_at: Option<OffsetDateTime>,
    finished_at: Option<OffsetDateTime>,
    score_saved: bool,
    last_active: Instant,
}

impl QuizSession {
    /// Create a session from the outcome of a question load.
    ///
    /// An empty set or a failed load puts the session straight into [`QuizPhase::Failed`].
    pub fn start(player_name: String, loaded: Result<Vec<Question>, LoadFailure>) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            player_name,
            questions: Vec::new(),
            current_index: 0,
            score: 0,
            phase: QuizPhase::Failed(LoadFailure::Empty),
            last_feedback: None,
            started_at: None,
            finished_at: None,
            score_saved: false,
            last_active: Instant::now(),
        };
        session.load(loaded);
        session
    }

    /// Restart the session with a freshly loaded question set. Allowed from every phase.
    pub fn reset(&mut self, loaded: Result<Vec<Question>, LoadFailure>) {
        self.load(loaded);
    }

    /// Answer the current question. Only valid while awaiting an answer.
    ///
    /// A selection that is not one of the options counts as a wrong answer. The point is
    /// credited on [`advance`](Self::advance), together with the move past the question, so
    /// `score <= current_index` holds in every phase.
    pub fn submit_answer(&mut self, selected: &str) -> Result<&Feedback, InvalidTransition> {
        let next = self.compute_transition(QuizEvent::SubmitAnswer)?;
        let question = &self.questions[self.current_index];

        let feedback = if question.is_correct(selected) {
            Feedback {
                is_correct: true,
                correct_answer: None,
            }
        } else {
            Feedback {
                is_correct: false,
                correct_answer: Some(question.correct_answer().to_string()),
            }
        };

        self.phase = next;
        self.last_active = Instant::now();
        Ok(self.last_feedback.insert(feedback))
    }

    /// Credit the answered question and move past it, finishing the session after the last one.
    pub fn advance(&mut self) -> Result<&QuizPhase, InvalidTransition> {
        let next = self.compute_transition(QuizEvent::Advance)?;

        if self
            .last_feedback
            .take()
            .is_some_and(|feedback| feedback.is_correct)
        {
            self.score += 1;
        }
        self.current_index += 1;
        if next == QuizPhase::Finished {
            self.finished_at = Some(OffsetDateTime::now_utc());
        }
        self.phase = next;
        self.last_active = Instant::now();

        Ok(&self.phase)
    }

    /// Session identifier handed to the client.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Player name entered at the start.
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Current phase.
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    /// Correct answers credited so far; the question on the feedback screen is not counted yet.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Zero-based position of the current question.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of questions in the session.
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Question being played, if the session is inside the question loop.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            QuizPhase::AwaitingAnswer | QuizPhase::Answered => {
                self.questions.get(self.current_index)
            }
            QuizPhase::Finished | QuizPhase::Failed(_) => None,
        }
    }

    /// Feedback of the last answer, cleared on advance.
    pub fn last_feedback(&self) -> Option<&Feedback> {
        self.last_feedback.as_ref()
    }

    /// When the current attempt started.
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        self.started_at
    }

    /// Final tally, available once the session is finished.
    pub fn result(&self) -> Option<QuizResult> {
        if self.phase != QuizPhase::Finished {
            return None;
        }

        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let duration_seconds = self
            .started_at
            .zip(self.finished_at)
            .map(|(started, finished)| (finished - started).as_seconds_f64().max(0.0));

        Some(QuizResult {
            player_name: self.player_name.clone(),
            score: self.score,
            total,
            passed: u64::from(self.score) * 2 > u64::from(total),
            duration_seconds,
        })
    }

    /// Last time the player acted on this session.
    pub fn last_active(&self) -> Instant {
        self.last_active
    }

    /// Whether the player has not acted for at least `ttl`.
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_active) >= ttl
    }

    /// Whether this attempt already made it to the leaderboard.
    pub fn score_saved(&self) -> bool {
        self.score_saved
    }

    /// Reserve the single leaderboard write of this attempt. Returns `false` if already taken.
    pub fn claim_score_save(&mut self) -> bool {
        !std::mem::replace(&mut self.score_saved, true)
    }

    /// Give the reservation back after a failed write.
    pub fn release_score_save(&mut self) {
        self.score_saved = false;
    }

    fn load(&mut self, loaded: Result<Vec<Question>, LoadFailure>) {
        self.current_index = 0;
        self.score = 0;
        self.last_feedback = None;
        self.finished_at = None;
        self.score_saved = false;
        self.last_active = Instant::now();

        match loaded {
            Ok(questions) if !questions.is_empty() => {
                self.questions = questions;
                self.started_at = Some(OffsetDateTime::now_utc());
                self.phase = QuizPhase::AwaitingAnswer;
            }
            Ok(_) => self.fail(LoadFailure::Empty),
            Err(failure) => self.fail(failure),
        }
    }

    fn fail(&mut self, failure: LoadFailure) {
        self.questions.clear();
        self.started_at = None;
        self.phase = QuizPhase::Failed(failure);
    }

    fn compute_transition(&self, event: QuizEvent) -> Result<QuizPhase, InvalidTransition> {
        let next = match (&self.phase, event) {
            (QuizPhase::AwaitingAnswer, QuizEvent::SubmitAnswer) => QuizPhase::Answered,
            (QuizPhase::Answered, QuizEvent::Advance) => {
                if self.current_index + 1 < self.questions.len() {
                    QuizPhase::AwaitingAnswer
                } else {
                    QuizPhase::Finished
                }
            }
            (from, event) => {
                return Err(InvalidTransition {
                    from: from.clone(),
                    event,
                });
            }
        };

        Ok(next)
    }
}
