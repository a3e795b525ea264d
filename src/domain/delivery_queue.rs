//! Per-subscriber delivery queue.
//!
//! Each subscriber owns one [`DeliveryQueue`]; the registry keeps the
//! matching [`QueueSender`]. Messages are shared behind an [`Arc`] so
//! fan-out clones a pointer, not the payload.
//!
//! Two growth policies are supported (see [`QueuePolicy`]):
//!
//! - **Unbounded**: the producer never waits and never drops. A stalled
//!   subscriber accumulates messages until it disconnects.
//! - **Bounded with disconnect**: once `capacity` messages are pending the
//!   next enqueue fails with [`EnqueueError::Full`] and the registry drops
//!   the subscriber.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::mpsc;

use super::{Message, SubscriberId};

/// How much a single subscriber may fall behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePolicy {
    /// No limit on pending messages.
    #[default]
    Unbounded,
    /// Disconnect the subscriber once this many messages are pending.
    DisconnectWhenFull(NonZeroUsize),
}

impl QueuePolicy {
    /// Builds a policy from a capacity where `0` means unbounded.
    #[must_use]
    pub fn from_capacity(capacity: usize) -> Self {
        NonZeroUsize::new(capacity).map_or(Self::Unbounded, Self::DisconnectWhenFull)
    }
}

/// Why an enqueue did not land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnqueueError {
    /// The bounded queue is at capacity.
    Full,
    /// The consumer side is gone or closed.
    Closed,
}

/// Producer half, held by the registry.
#[derive(Debug)]
pub(crate) enum QueueSender {
    Unbounded(mpsc::UnboundedSender<Arc<Message>>),
    Bounded(mpsc::Sender<Arc<Message>>),
}

impl QueueSender {
    /// Non-blocking enqueue.
    pub(crate) fn enqueue(&self, message: Arc<Message>) -> Result<(), EnqueueError> {
        match self {
            Self::Unbounded(tx) => tx.send(message).map_err(|_| EnqueueError::Closed),
            Self::Bounded(tx) => tx.try_send(message).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => EnqueueError::Full,
                mpsc::error::TrySendError::Closed(_) => EnqueueError::Closed,
            }),
        }
    }
}

#[derive(Debug)]
enum QueueReceiver {
    Unbounded(mpsc::UnboundedReceiver<Arc<Message>>),
    Bounded(mpsc::Receiver<Arc<Message>>),
}

/// Consumer half of a subscriber's queue.
///
/// Yields messages in exactly the order they were enqueued. Once closed
/// (by [`DeliveryQueue::close`] or because the registry dropped the
/// sender) any buffered messages are still delivered, after which
/// [`DeliveryQueue::dequeue_next`] returns `None`.
#[derive(Debug)]
pub struct DeliveryQueue {
    id: SubscriberId,
    rx: QueueReceiver,
}

impl DeliveryQueue {
    /// Returns the handle under which this queue is registered.
    #[must_use]
    pub const fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next message; `None` once closed and drained.
    pub async fn dequeue_next(&mut self) -> Option<Arc<Message>> {
        match &mut self.rx {
            QueueReceiver::Unbounded(rx) => rx.recv().await,
            QueueReceiver::Bounded(rx) => rx.recv().await,
        }
    }

    /// Polling form of [`DeliveryQueue::dequeue_next`].
    pub fn poll_dequeue(&mut self, cx: &mut Context<'_>) -> Poll<Option<Arc<Message>>> {
        match &mut self.rx {
            QueueReceiver::Unbounded(rx) => rx.poll_recv(cx),
            QueueReceiver::Bounded(rx) => rx.poll_recv(cx),
        }
    }

    /// Stops accepting new messages. Idempotent.
    pub fn close(&mut self) {
        match &mut self.rx {
            QueueReceiver::Unbounded(rx) => rx.close(),
            QueueReceiver::Bounded(rx) => rx.close(),
        }
    }

    /// Returns the number of buffered, undelivered messages.
    #[must_use]
    pub fn pending(&self) -> usize {
        match &self.rx {
            QueueReceiver::Unbounded(rx) => rx.len(),
            QueueReceiver::Bounded(rx) => rx.len(),
        }
    }
}

/// Creates a connected sender/queue pair for `id` under `policy`.
pub(crate) fn queue(id: SubscriberId, policy: QueuePolicy) -> (QueueSender, DeliveryQueue) {
    match policy {
        QueuePolicy::Unbounded => {
            let (tx, rx) = mpsc::unbounded_channel();
            (
                QueueSender::Unbounded(tx),
                DeliveryQueue {
                    id,
                    rx: QueueReceiver::Unbounded(rx),
                },
            )
        }
        QueuePolicy::DisconnectWhenFull(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.get());
            (
                QueueSender::Bounded(tx),
                DeliveryQueue {
                    id,
                    rx: QueueReceiver::Bounded(rx),
                },
            )
        }
    }
}
