//! `campusops-events` — the event publication contract.
//!
//! Both engines notify the downstream notification pipeline through the
//! [`EventPublisher`] port defined here: a topic plus a free-form,
//! human-readable message body. Publication is fire-and-forget with an
//! at-most-once attempt per call; callers decide what a failure means for
//! the enclosing operation.

pub mod in_memory;
pub mod publisher;

pub use in_memory::InMemoryEventBus;
pub use publisher::{EventMessage, EventPublisher, PublishError, Subscription};
