use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{score_store::ScoreStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep the primary score store installed while it is healthy.
///
/// Connects with exponential backoff, then polls the store. While it is failing the leaderboard
/// is served by the fallback store; once it answers again it is installed back.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn ScoreStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_score_store(store.clone()).await;
                info!(
                    backend = store.backend(),
                    "score store connected; leaving degraded mode"
                );
                delay = INITIAL_DELAY;

                supervise(&state, &store).await;

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "score store connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll an installed store until reconnecting it is no longer possible.
async fn supervise(state: &SharedState, store: &Arc<dyn ScoreStore>) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                // A failed request may have dropped the store in the meantime.
                if state.score_store().await.is_none() {
                    info!(
                        backend = store.backend(),
                        "score store healthy again; leaving degraded mode"
                    );
                    state.install_score_store(store.clone()).await;
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "score store health check failed");
                if !reconnect(state, store).await {
                    warn!("exhausted score store reconnect attempts; staying in degraded mode");
                    return;
                }
                state.install_score_store(store.clone()).await;
                sleep(HEALTH_POLL_INTERVAL).await;
            }
        }
    }
}

async fn reconnect(state: &SharedState, store: &Arc<dyn ScoreStore>) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "score store reconnection succeeded");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "score store reconnect first attempt failed; entering degraded mode"
                    );
                    state.clear_score_store().await;
                } else {
                    warn!(attempt, error = %err, "score store reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::score_store::memory::MemoryScoreStore,
        state::tests::{test_state, trivia_batch},
    };

    #[tokio::test(start_paused = true)]
    async fn outage_degrades_and_recovery_reinstalls() {
        let state = test_state(Some(trivia_batch(1)));
        state.expect_primary_store();
        let primary = MemoryScoreStore::new();

        let handle = {
            let primary = primary.clone();
            tokio::spawn(run(state.clone(), move || {
                let store: Arc<dyn ScoreStore> = Arc::new(primary.clone());
                async move { Ok(store) }
            }))
        };

        sleep(Duration::from_millis(10)).await;
        assert!(!state.is_degraded());
        assert!(state.score_store().await.is_some());

        primary.set_offline(true);
        sleep(HEALTH_POLL_INTERVAL + Duration::from_millis(10)).await;
        assert!(state.is_degraded());
        assert!(state.score_store().await.is_none());

        primary.set_offline(false);
        sleep(MAX_DELAY * 2).await;
        assert!(!state.is_degraded());
        assert!(state.score_store().await.is_some());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connection_keeps_fallback_active() {
        let state = test_state(Some(trivia_batch(1)));
        state.expect_primary_store();

        let handle = tokio::spawn(run(state.clone(), || async {
            Err::<Arc<dyn ScoreStore>, _>(StorageError::unavailable(
                "unreachable".into(),
                std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            ))
        }));

        sleep(MAX_DELAY).await;
        assert!(state.is_degraded());
        assert_eq!(state.active_score_store().await.backend(), "memory");

        handle.abort();
    }
}
