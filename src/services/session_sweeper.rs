use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use crate::state::SharedState;

/// How often idle sessions are looked for.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically drop sessions whose player stopped acting on them.
pub async fn run(state: SharedState) {
    loop {
        sleep(SWEEP_INTERVAL).await;
        let evicted = sweep(&state, Instant::now());
        if evicted > 0 {
            debug!(evicted, remaining = state.sessions().len(), "evicted idle quiz sessions");
        }
    }
}

/// Remove every session idle for at least the configured timeout. Returns how many were dropped.
pub fn sweep(state: &SharedState, now: Instant) -> usize {
    let ttl = state.config().session_idle_timeout;
    let before = state.sessions().len();
    state
        .sessions()
        .retain(|_, session| !session.is_idle(now, ttl));
    before.saturating_sub(state.sessions().len())
}
