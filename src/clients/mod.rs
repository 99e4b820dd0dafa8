//! HTTP collaborators: the trivia question source and the translation service.

/// Error types shared by the HTTP clients.
pub mod error;
/// Google Translate client and the pass-through translator.
pub mod translate;
/// Trivia API client.
pub mod trivia;
