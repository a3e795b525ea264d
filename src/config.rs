//! Server configuration from the command line and environment.
//!
//! Every flag has an environment-variable fallback, and a `.env` file is
//! loaded first via `dotenvy`, so the server can be configured either way.
//!
//! | Flag                    | Variable                  | Default     |
//! |-------------------------|---------------------------|-------------|
//! | `--host`                | `SSE_HOST`                | `localhost` |
//! | `--port`                | `SSE_PORT`                | `8080`      |
//! | `--dir`                 | `SSE_STATIC_DIR`          | `static`    |
//! | `--keep-alive-secs`     | `SSE_KEEP_ALIVE_SECS`     | `15`        |
//! | `--queue-capacity`      | `SSE_QUEUE_CAPACITY`      | `0`         |
//! | `--shutdown-grace-secs` | `SSE_SHUTDOWN_GRACE_SECS` | `5`         |

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::domain::QueuePolicy;
use crate::error::ServerError;

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::load`].
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sse-repl",
    version,
    about = "Broadcast console input to Server-Sent Events subscribers"
)]
pub struct ServerConfig {
    /// Host to bind to.
    #[arg(long, env = "SSE_HOST", default_value = "localhost")]
    pub host: String,

    /// Port to bind to (0 for auto-assign).
    #[arg(long, env = "SSE_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory to serve static files from.
    #[arg(long = "dir", env = "SSE_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Seconds between SSE keep-alive comments (0 disables them).
    #[arg(long, env = "SSE_KEEP_ALIVE_SECS", default_value_t = 15)]
    pub keep_alive_secs: u64,

    /// Pending messages allowed per subscriber before it is dropped
    /// (0 = unbounded).
    #[arg(long, env = "SSE_QUEUE_CAPACITY", default_value_t = 0)]
    pub queue_capacity: usize,

    /// Seconds to wait for connections to drain on shutdown.
    #[arg(long, env = "SSE_SHUTDOWN_GRACE_SECS", default_value_t = 5)]
    pub shutdown_grace_secs: u64,
}

impl ServerConfig {
    /// Loads `.env` (if present) and parses the process arguments.
    ///
    /// Exits the process with usage on invalid arguments, like any
    /// `clap` binary.
    #[must_use]
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    /// Returns the `host:port` string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the per-subscriber queue policy.
    #[must_use]
    pub fn queue_policy(&self) -> QueuePolicy {
        QueuePolicy::from_capacity(self.queue_capacity)
    }

    /// Returns the keep-alive interval, `None` when disabled.
    #[must_use]
    pub fn keep_alive(&self) -> Option<Duration> {
        (self.keep_alive_secs > 0).then(|| Duration::from_secs(self.keep_alive_secs))
    }

    /// Returns the graceful shutdown deadline.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Creates the static directory if needed and returns its canonical path.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::NotADirectory`] if the path exists but is a
    /// file, or [`ServerError::StaticDir`] if it cannot be created or
    /// resolved.
    pub fn prepare_static_dir(&self) -> Result<PathBuf, ServerError> {
        prepare_dir(&self.static_dir)
    }
}

fn prepare_dir(path: &Path) -> Result<PathBuf, ServerError> {
    let io_err = |source| ServerError::StaticDir {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        tracing::info!(dir = %path.display(), "creating static directory");
        std::fs::create_dir_all(path).map_err(io_err)?;
    }
    if !path.is_dir() {
        return Err(ServerError::NotADirectory(path.to_path_buf()));
    }
    path.canonicalize().map_err(io_err)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("sse-repl-config-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn explicit_flags_are_parsed() {
        let Ok(config) = ServerConfig::try_parse_from([
            "sse-repl",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--dir",
            "/srv/www",
            "--queue-capacity",
            "64",
            "--keep-alive-secs",
            "0",
        ]) else {
            panic!("flags should parse");
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.static_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.queue_policy(), QueuePolicy::from_capacity(64));
        assert!(config.keep_alive().is_none());
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(ServerConfig::try_parse_from(["sse-repl", "--port", "99999"]).is_err());
    }

    #[test]
    fn prepare_creates_missing_directory() {
        let dir = scratch_dir();
        let Ok(resolved) = prepare_dir(&dir) else {
            panic!("directory should be created");
        };
        assert!(resolved.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn prepare_rejects_regular_file() {
        let dir = scratch_dir();
        let _ = std::fs::create_dir_all(&dir);
        let file = dir.join("not-a-dir");
        let _ = std::fs::write(&file, b"x");

        let result = prepare_dir(&file);
        assert!(matches!(result, Err(ServerError::NotADirectory(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
