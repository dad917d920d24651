//! Error types for the pm2 log stream.

use thiserror::Error;

/// Log source error type.
#[derive(Debug, Error)]
pub enum LogSourceError {
    /// Failed to spawn the pm2 process.
    #[error("failed to spawn pm2: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// The spawned process exposed no stdout handle.
    #[error("pm2 process has no stdout handle")]
    NoStdout,

    /// The spawned process exposed no stderr handle.
    #[error("pm2 process has no stderr handle")]
    NoStderr,
}

/// Result type for log source operations.
pub type LogSourceResult<T> = Result<T, LogSourceError>;
