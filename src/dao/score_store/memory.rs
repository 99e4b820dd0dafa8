//! In-memory store used by tests, with a switch to simulate an outage.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;

use crate::dao::{
    models::ScoreEntity,
    score_store::ScoreStore,
    storage::{StorageError, StorageResult},
};

/// Rows kept in a shared vector; clones see the same data.
#[derive(Clone, Default)]
pub struct MemoryScoreStore {
    rows: Arc<Mutex<Vec<ScoreEntity>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryScoreStore {
    /// Empty store, online.
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails as unavailable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of the stored rows.
    pub fn rows(&self) -> Vec<ScoreEntity> {
        self.rows.lock().unwrap().clone()
    }

    fn check_online(&self) -> StorageResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StorageError::unavailable(
                "memory store offline".into(),
                std::io::Error::from(std::io::ErrorKind::NotConnected),
            ))
        } else {
            Ok(())
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn append(&self, score: ScoreEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_online()?;
            store.rows.lock().unwrap().push(score);
            Ok(())
        })
    }

    fn list_scores(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.check_online()?;
            Ok(store.rows())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.check_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}
