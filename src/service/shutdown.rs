//! Process-wide shutdown signal.
//!
//! [`ShutdownTrigger`] is cheap to clone and may be fired from any thread,
//! including the blocking console thread. [`ShutdownListener`] waits for
//! it inside the runtime.

use std::sync::Arc;

use tokio::sync::watch;

/// Fires the shutdown signal. Clones share the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

/// Waits for the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownTrigger {
    /// Creates a new, unfired signal.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fires the signal. Idempotent; safe from non-runtime threads.
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("shutdown requested");
        }
    }

    /// Returns `true` once [`ShutdownTrigger::trigger`] has been called.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Creates a listener for this signal.
    #[must_use]
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ShutdownTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownListener {
    /// Resolves once the signal has fired, immediately if it already has.
    pub async fn wait(&mut self) {
        // The sender lives as long as any trigger; an error means every
        // trigger is gone and shutdown can never be requested.
        let fired = self.rx.wait_for(|fired| *fired).await.is_ok();
        if !fired {
            std::future::pending::<()>().await;
        }
    }
}
