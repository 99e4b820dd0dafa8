//! Application-level configuration loading: trivia source, translation and leaderboard settings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CULTURA_QUIZ_CONFIG_PATH";

const DEFAULT_TRIVIA_URL: &str = "https://the-trivia-api.com/api/questions";
const DEFAULT_QUESTION_LIMIT: usize = 5;
const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const DEFAULT_TARGET_LANGUAGE: &str = "es";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SCORE_FILE: &str = "data/scores.jsonl";
const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Endpoint returning random trivia questions.
    pub trivia_url: String,
    /// Number of questions per quiz.
    pub question_limit: usize,
    /// Whether questions are machine-translated before being served.
    pub translation_enabled: bool,
    /// Translation endpoint.
    pub translate_url: String,
    /// Language every text is translated into.
    pub target_language: String,
    /// Upper bound for a single outbound HTTP request.
    pub request_timeout: Duration,
    /// Upper bound for fetching and translating a whole question set.
    pub load_timeout: Duration,
    /// JSON Lines file used as secondary leaderboard store.
    pub score_file: PathBuf,
    /// Rows returned by the leaderboard when the client does not ask for a limit.
    pub leaderboard_limit: usize,
    /// Sessions without any player action for this long are dropped.
    pub session_idle_timeout: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        question_limit = app_config.question_limit,
                        translation = app_config.translation_enabled,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent keys keep their default value.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    trivia: RawTrivia,
    translation: RawTranslation,
    request_timeout_ms: Option<u64>,
    load_timeout_ms: Option<u64>,
    session_idle_timeout_ms: Option<u64>,
    leaderboard: RawLeaderboard,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTrivia {
    base_url: Option<String>,
    question_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTranslation {
    enabled: Option<bool>,
    base_url: Option<String>,
    target_language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLeaderboard {
    local_path: Option<PathBuf>,
    default_limit: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            trivia_url: value
                .trivia
                .base_url
                .unwrap_or_else(|| DEFAULT_TRIVIA_URL.into()),
            question_limit: value
                .trivia
                .question_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_QUESTION_LIMIT),
            translation_enabled: value.translation.enabled.unwrap_or(true),
            translate_url: value
                .translation
                .base_url
                .unwrap_or_else(|| DEFAULT_TRANSLATE_URL.into()),
            target_language: value
                .translation
                .target_language
                .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.into()),
            request_timeout: value
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            load_timeout: value
                .load_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_LOAD_TIMEOUT),
            score_file: value
                .leaderboard
                .local_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCORE_FILE)),
            leaderboard_limit: value
                .leaderboard
                .default_limit
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
            session_idle_timeout: value
                .session_idle_timeout_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.question_limit, 5);
        assert_eq!(config.target_language, "es");
        assert!(config.translation_enabled);
    }

    #[test]
    fn partial_document_overrides_only_given_keys() {
        let config = AppConfig::from_json(
            r#"{
                "trivia": { "question_limit": 10 },
                "translation": { "enabled": false },
                "request_timeout_ms": 2500,
                "leaderboard": { "local_path": "/tmp/scores.jsonl" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.question_limit, 10);
        assert!(!config.translation_enabled);
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.score_file, PathBuf::from("/tmp/scores.jsonl"));
        assert_eq!(config.trivia_url, DEFAULT_TRIVIA_URL);
        assert_eq!(config.leaderboard_limit, DEFAULT_LEADERBOARD_LIMIT);
        assert_eq!(config.session_idle_timeout, DEFAULT_SESSION_IDLE_TIMEOUT);
    }

    #[test]
    fn idle_timeout_is_read_in_milliseconds() {
        let config = AppConfig::from_json(r#"{ "session_idle_timeout_ms": 90000 }"#).unwrap();
        assert_eq!(config.session_idle_timeout, Duration::from_secs(90));
    }

    #[test]
    fn zero_limits_fall_back_to_defaults() {
        let config = AppConfig::from_json(
            r#"{ "trivia": { "question_limit": 0 }, "leaderboard": { "default_limit": 0 } }"#,
        )
        .unwrap();
        assert_eq!(config.question_limit, DEFAULT_QUESTION_LIMIT);
        assert_eq!(config.leaderboard_limit, DEFAULT_LEADERBOARD_LIMIT);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(AppConfig::from_json(r#"{ "trivia": 3 }"#).is_err());
    }
}
