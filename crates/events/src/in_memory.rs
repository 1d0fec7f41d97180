//! In-memory event bus for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::publisher::{EventMessage, EventPublisher, PublishError, Subscription};

/// In-memory pub/sub bus.
///
/// - No IO / no async
/// - Best-effort fan-out; dead subscribers are pruned on publish
/// - Stands in for the broker adapter wherever one isn't wired up
#[derive(Debug, Default)]
pub struct InMemoryEventBus {
    subscribers: Mutex<Vec<mpsc::Sender<EventMessage>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every message published after this call.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned we still hand back a subscription;
        // it just won't receive messages until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, topic: &str, body: &str) -> Result<(), PublishError> {
        let mut subs = self.subscribers.lock().map_err(|_| PublishError::Closed)?;

        let message = EventMessage {
            topic: topic.to_string(),
            body: body.to_string(),
        };

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }
}
