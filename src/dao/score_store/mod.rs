/// CouchDB-backed primary store.
#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod file;
#[cfg(test)]
pub mod memory;

use crate::dao::models::ScoreEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over an append-only leaderboard backend.
pub trait ScoreStore: Send + Sync {
    /// Short backend name used in logs and health reports.
    fn backend(&self) -> &'static str;
    /// Append a new row. Existing rows are never touched.
    fn append(&self, score: ScoreEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Every stored row, in no particular order.
    fn list_scores(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish whatever the backend needs after an outage.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
