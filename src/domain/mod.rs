//! Domain layer: messages, parsing, delivery queues, and the subscriber
//! registry.
//!
//! Everything here is transport-agnostic. The SSE layer (`crate::sse`)
//! and the publish coordinator (`crate::service`) build on these types.

pub mod delivery_queue;
pub mod message;
pub mod parser;
pub mod subscriber_id;
pub mod subscriber_registry;

pub use delivery_queue::{DeliveryQueue, QueuePolicy};
pub use message::{Message, MessageKind};
pub use parser::{Command, Input, parse_line};
pub use subscriber_id::SubscriberId;
pub use subscriber_registry::SubscriberRegistry;
