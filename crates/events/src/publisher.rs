//! Event publication port (mechanics only).
//!
//! The publisher is **transport-agnostic**: an implementation may sit on an
//! in-memory channel, a message broker, or anything else that can carry a
//! `(topic, body)` pair. The contract is deliberately narrow:
//!
//! - **At-most-once attempt**: one publish call makes one delivery attempt.
//!   There is no internal retry and no buffering.
//! - **No rollback**: a message handed to the broker stays handed over, even
//!   if the caller's surrounding unit of work later fails.
//! - **Failures surface**: a failed publish is returned to the caller, never
//!   swallowed. What that means for already-committed state is the caller's
//!   policy, not the publisher's.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event emission failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The broker rejected or failed the delivery attempt.
    #[error("broker rejected publish: {0}")]
    Broker(String),

    /// The bus is no longer accepting messages.
    #[error("event bus closed")]
    Closed,
}

/// A published message: topic plus human-readable body.
///
/// Bodies embed entity identifiers as plain text; they are not structured
/// payloads (the downstream notification processor stores them verbatim).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMessage {
    pub topic: String,
    pub body: String,
}

/// Fire-and-forget event publication port.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, topic: &str, body: &str) -> Result<(), PublishError>;
}

impl<P> EventPublisher for Arc<P>
where
    P: EventPublisher + ?Sized,
{
    fn publish(&self, topic: &str, body: &str) -> Result<(), PublishError> {
        (**self).publish(topic, body)
    }
}

/// A subscription to the message stream of a bus.
///
/// Each subscription receives a copy of every message published after it was
/// created (broadcast semantics). Intended for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<EventMessage>,
}

impl Subscription {
    pub fn new(receiver: Receiver<EventMessage>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<EventMessage, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<EventMessage, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<EventMessage, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered, without blocking.
    pub fn drain(&self) -> Vec<EventMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.receiver.try_recv() {
            out.push(msg);
        }
        out
    }
}
