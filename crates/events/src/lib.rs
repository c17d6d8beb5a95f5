//! Scene QA review event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ReviewEvent`]: the review domain event envelope.
//! - [`EventLogger`]: background subscriber that writes every event to
//!   the tracing log.

pub mod bus;
pub mod logger;

pub use bus::{EventBus, ReviewEvent};
pub use logger::EventLogger;
