//! Error types.
//!
//! [`ServerError`] covers startup and configuration failures.
//! [`PublishError`] is what the operator sees when a message could not be
//! handed to the broadcaster. Neither is fatal to running subscribers.

use std::path::PathBuf;

/// Startup and configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The static directory path exists but is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The static directory could not be created or resolved.
    #[error("static directory {}: {source}", .path.display())]
    StaticDir {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Binding the listening socket failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// `host:port` that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure while serving.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to publish one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    /// The coordinator is no longer running.
    #[error("broadcaster unavailable")]
    Unavailable,

    /// The request was dropped before fan-out completed.
    #[error("publish request abandoned before completion")]
    Abandoned,

    /// The registry has been shut down.
    #[error("server is shutting down")]
    ShuttingDown,
}
