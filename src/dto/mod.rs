//! Wire-level request and response payloads.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health endpoint payload.
pub mod health;
/// Score submission and leaderboard payloads.
pub mod leaderboard;
/// Quiz session payloads.
pub mod quiz;
pub mod validation;

fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
