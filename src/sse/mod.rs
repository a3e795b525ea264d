//! Server-Sent Events layer: session lifecycle, encoding, and the HTTP
//! handler.
//!
//! Each `GET /events` request owns one [`session::SubscriptionSession`],
//! which drains its delivery queue through [`encode::encode`] into the
//! response body.

pub mod encode;
pub mod handler;
pub mod session;

pub use handler::events_handler;
pub use session::{SessionState, SubscriptionSession};
