/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Leaderboard writes and ranked reads.
pub mod leaderboard_service;
/// Question fetching and translation.
pub mod question_service;
/// Quiz session lifecycle.
pub mod quiz_service;
/// Eviction of abandoned quiz sessions.
pub mod session_sweeper;
/// Primary score store connection supervisor.
pub mod storage_supervisor;
