use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use super::error::{ClientError, ClientResult};

/// Question as returned by the trivia API, before translation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriviaQuestion {
    /// Question text. Accepts both the plain string and the `{ "text": ... }` layouts.
    #[serde(deserialize_with = "question_text")]
    pub question: String,
    /// The right answer.
    pub correct_answer: String,
    /// Distractors.
    pub incorrect_answers: Vec<String>,
}

fn question_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Plain(String),
        Structured { text: String },
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::Plain(text) | Text::Structured { text } => text,
    })
}

/// Source of raw trivia questions.
pub trait QuestionSource: Send + Sync {
    /// Fetch up to `limit` random questions.
    fn fetch(&self, limit: usize) -> BoxFuture<'static, ClientResult<Vec<TriviaQuestion>>>;
}

/// Client for `the-trivia-api.com` style endpoints.
#[derive(Clone)]
pub struct TriviaApiClient {
    client: Client,
    base_url: Arc<str>,
}

impl TriviaApiClient {
    /// Build a client whose requests are bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url),
        })
    }

    async fn fetch_questions(&self, limit: usize) -> ClientResult<Vec<TriviaQuestion>> {
        let url = self.base_url.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|source| ClientError::RequestSend {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ClientError::RequestStatus {
                url,
                status: response.status(),
            });
        }

        let questions = response
            .json::<Vec<TriviaQuestion>>()
            .await
            .map_err(|source| ClientError::DecodeResponse { url, source })?;

        Ok(truncate_to_limit(questions, limit))
    }
}

/// The API may ignore `limit`; anything past it is dropped.
fn truncate_to_limit(mut questions: Vec<TriviaQuestion>, limit: usize) -> Vec<TriviaQuestion> {
    if questions.len() > limit {
        warn!(
            received = questions.len(),
            limit, "trivia API returned more questions than requested; truncating"
        );
        questions.truncate(limit);
    }
    questions
}

impl QuestionSource for TriviaApiClient {
    fn fetch(&self, limit: usize) -> BoxFuture<'static, ClientResult<Vec<TriviaQuestion>>> {
        let client = self.clone();
        Box::pin(async move { client.fetch_questions(limit).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_question_layout() {
        let payload = r#"[{
            "category": "Geography",
            "question": "What is the capital of France?",
            "correctAnswer": "Paris",
            "incorrectAnswers": ["Rome", "Madrid", "Berlin"]
        }]"#;

        let questions: Vec<TriviaQuestion> = serde_json::from_str(payload).unwrap();
        assert_eq!(
            questions,
            vec![TriviaQuestion {
                question: "What is the capital of France?".into(),
                correct_answer: "Paris".into(),
                incorrect_answers: vec!["Rome".into(), "Madrid".into(), "Berlin".into()],
            }]
        );
    }

    fn question(n: usize) -> TriviaQuestion {
        TriviaQuestion {
            question: format!("q{n}"),
            correct_answer: "a".into(),
            incorrect_answers: vec!["b".into()],
        }
    }

    #[test]
    fn oversized_batch_is_cut_to_limit() {
        let batch = (0..8).map(question).collect();
        let kept = truncate_to_limit(batch, 5);
        assert_eq!(kept.len(), 5);
        assert_eq!(kept[4].question, "q4");

        let short = truncate_to_limit(vec![question(0)], 5);
        assert_eq!(short.len(), 1);
    }

    #[test]
    fn parses_structured_question_layout() {
        let payload = r#"{
            "question": { "text": "Which planet is red?" },
            "correctAnswer": "Mars",
            "incorrectAnswers": ["Venus"]
        }"#;

        let question: TriviaQuestion = serde_json::from_str(payload).unwrap();
        assert_eq!(question.question, "Which planet is red?");
    }
}
