//! Service layer: the publish coordinator and the shutdown signal.
//!
//! These are the only pieces that cross between the blocking console
//! thread and the async runtime.

pub mod publisher;
pub mod shutdown;

pub use publisher::{Publish, PublishCoordinator, Publisher};
pub use shutdown::{ShutdownListener, ShutdownTrigger};
