//! Hand-off from the blocking console thread to the async broadcaster.
//!
//! The console reads stdin on a plain OS thread; the registry and every
//! subscriber stream live on the Tokio runtime. [`channel`] connects the
//! two:
//!
//! ```text
//! console thread                      runtime
//! ──────────────                      ───────
//! Publisher::publish_blocking ──mpsc──▶ PublishCoordinator::run
//!        │ (blocks)                        │ registry.broadcast(msg)
//!        ◀────────────oneshot reply────────┘
//! ```
//!
//! The caller stays blocked until fan-out has finished, so a failure is
//! reported for the exact message that caused it. A single coordinator
//! task serves requests one at a time.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::shutdown::ShutdownListener;
use crate::domain::{Message, SubscriberRegistry};
use crate::error::PublishError;

/// Requests that may queue up behind the one being served.
const REQUEST_QUEUE_DEPTH: usize = 16;

/// Outcome of one publish: the number of subscribers that received it.
pub type PublishResult = Result<usize, PublishError>;

/// One message awaiting fan-out plus its completion signal.
#[derive(Debug)]
pub struct PublishRequest {
    message: Message,
    reply: oneshot::Sender<PublishResult>,
}

/// Anything that can publish a message synchronously.
///
/// Implemented by [`Publisher`]; the console loop is generic over it.
pub trait Publish {
    /// Publishes `message`, blocking until fan-out completes.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the message could not be broadcast.
    fn publish_blocking(&self, message: Message) -> PublishResult;
}

/// Sending side, used from outside the runtime. Clones share one
/// coordinator.
#[derive(Debug, Clone)]
pub struct Publisher {
    requests: mpsc::Sender<PublishRequest>,
}

/// Runtime side: owns the registry handle and serves requests.
#[derive(Debug)]
pub struct PublishCoordinator {
    requests: mpsc::Receiver<PublishRequest>,
    registry: Arc<SubscriberRegistry>,
}

/// Creates a connected publisher/coordinator pair for `registry`.
#[must_use]
pub fn channel(registry: Arc<SubscriberRegistry>) -> (Publisher, PublishCoordinator) {
    let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
    (
        Publisher { requests: tx },
        PublishCoordinator {
            requests: rx,
            registry,
        },
    )
}

impl Publisher {
    /// Publishes from a non-async thread and waits for the result.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Unavailable`] if the coordinator has stopped.
    /// - [`PublishError::Abandoned`] if it stopped before serving this
    ///   request.
    /// - [`PublishError::ShuttingDown`] if the registry is closed.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context; use
    /// [`Publisher::publish`] there.
    pub fn publish_blocking(&self, message: Message) -> PublishResult {
        let (reply, done) = oneshot::channel();
        self.requests
            .blocking_send(PublishRequest { message, reply })
            .map_err(|_| PublishError::Unavailable)?;
        done.blocking_recv().map_err(|_| PublishError::Abandoned)?
    }

    /// Async form of [`Publisher::publish_blocking`].
    ///
    /// # Errors
    ///
    /// Same as [`Publisher::publish_blocking`].
    pub async fn publish(&self, message: Message) -> PublishResult {
        let (reply, done) = oneshot::channel();
        self.requests
            .send(PublishRequest { message, reply })
            .await
            .map_err(|_| PublishError::Unavailable)?;
        done.await.map_err(|_| PublishError::Abandoned)?
    }
}

impl Publish for Publisher {
    fn publish_blocking(&self, message: Message) -> PublishResult {
        Self::publish_blocking(self, message)
    }
}

impl PublishCoordinator {
    /// Serves publish requests until shutdown or until every
    /// [`Publisher`] is dropped.
    ///
    /// Requests still queued when it stops are answered with
    /// [`PublishError::Abandoned`] (their reply channel is dropped).
    pub async fn run(mut self, mut shutdown: ShutdownListener) {
        tracing::debug!("publish coordinator started");
        loop {
            tokio::select! {
                biased;
                () = shutdown.wait() => break,
                request = self.requests.recv() => match request {
                    Some(request) => self.serve(request),
                    None => break,
                },
            }
        }
        tracing::debug!("publish coordinator stopped");
    }

    fn serve(&self, request: PublishRequest) {
        let PublishRequest { message, reply } = request;
        let result = if self.registry.is_open() {
            let delivered = self.registry.broadcast(message);
            Ok(delivered)
        } else {
            Err(PublishError::ShuttingDown)
        };
        // The caller may have given up; nothing to report to.
        let _ = reply.send(result);
    }
}
