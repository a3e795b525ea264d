//! Shared application state injected into all Axum handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::SubscriberRegistry;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry every `/events` session registers with.
    pub registry: Arc<SubscriberRegistry>,
    /// Interval between SSE keep-alive comments; `None` disables them.
    pub keep_alive: Option<Duration>,
}

impl AppState {
    /// Creates state around `registry` with keep-alives disabled.
    #[must_use]
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            registry,
            keep_alive: None,
        }
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn with_keep_alive(mut self, keep_alive: Option<Duration>) -> Self {
        self.keep_alive = keep_alive;
        self
    }
}
