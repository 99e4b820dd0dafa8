//! Library crate for cultura-quiz-back, exposing modules for binaries and integration tests.

pub mod clients;
pub mod config;
/// Score persistence.
pub mod dao;
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routing.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared application state and the quiz domain.
pub mod state;
