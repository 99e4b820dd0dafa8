//! Local JSON Lines leaderboard used when the primary store is not reachable.

use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::warn;

use crate::dao::{
    models::ScoreEntity,
    score_store::ScoreStore,
    storage::{StorageError, StorageResult},
};

/// Failures of the local score file.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// The parent directory could not be created.
    #[error("failed to create directory `{path}`")]
    CreateDir {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Opening, writing or reading the file failed.
    #[error("failed to access score file `{path}`")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// A row could not be encoded.
    #[error("failed to encode score row")]
    Encode {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl From<FileStoreError> for StorageError {
    fn from(err: FileStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// Append-only score file, one JSON document per line.
#[derive(Clone)]
pub struct FileScoreStore {
    path: PathBuf,
    write_gate: Arc<Mutex<()>>,
}

impl FileScoreStore {
    /// Use `path` as backing file. The file is created on the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    async fn ensure_parent(&self) -> Result<(), FileStoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|source| FileStoreError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                }),
            _ => Ok(()),
        }
    }

    async fn append_line(&self, score: &ScoreEntity) -> Result<(), FileStoreError> {
        let mut line =
            serde_json::to_vec(score).map_err(|source| FileStoreError::Encode { source })?;
        line.push(b'\n');

        self.ensure_parent().await?;

        let _gate = self.write_gate.lock().await;
        let io_err = |source| FileStoreError::Io {
            path: self.path.clone(),
            source,
        };
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        // A single write keeps each row whole for concurrent appenders.
        file.write_all(&line).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)
    }

    async fn read_all(&self) -> Result<Vec<ScoreEntity>, FileStoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(FileStoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let scores = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(score) => Some(score),
                Err(err) => {
                    warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        error = %err,
                        "skipping unreadable score row"
                    );
                    None
                }
            })
            .collect();

        Ok(scores)
    }
}

impl ScoreStore for FileScoreStore {
    fn backend(&self) -> &'static str {
        "local-file"
    }

    fn append(&self, score: ScoreEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_line(&score).await.map_err(Into::into) })
    }

    fn list_scores(&self) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.read_all().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_parent().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.health_check()
    }
}
