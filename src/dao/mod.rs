/// Persisted model definitions.
pub mod models;
/// Leaderboard storage backends.
pub mod score_store;
/// Storage abstraction layer shared by every backend.
pub mod storage;
