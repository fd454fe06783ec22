use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] pagesync_core::Error),
    #[error(transparent)]
    Sync(#[from] pagesync_core::SyncError),
    #[error(transparent)]
    Graph(#[from] pagesync_core::graph::GraphError),
    #[error(transparent)]
    Auth(#[from] pagesync_core::auth::AuthError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Remote post id cannot be empty")]
    EmptyRemotePostId,
    #[error("No sync record for entry {0}")]
    RecordNotFound(i64),
    #[error("No sync record points at remote post {0}")]
    RemotePostNotFound(String),
}
