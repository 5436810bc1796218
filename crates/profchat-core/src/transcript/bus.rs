//! Broadcast bus for distributing `TranscriptEvent` to observers.
//!
//! Built on `tokio::sync::broadcast`, the `TranscriptBus` supports multiple
//! concurrent subscribers. Publishing with no active subscribers is a no-op.

use profchat_types::event::TranscriptEvent;
use tokio::sync::broadcast;

/// Multi-consumer bus for transcript change notifications.
///
/// Cloning the bus clones the sender, so every clone publishes into the
/// same channel.
pub struct TranscriptBus {
    sender: broadcast::Sender<TranscriptEvent>,
}

impl TranscriptBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// A subscriber that falls more than `capacity` events behind receives
    /// `RecvError::Lagged` and should resynchronise from a snapshot.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: TranscriptEvent) {
        let _ = self.sender.send(event);
    }
}

impl Clone for TranscriptBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl std::fmt::Debug for TranscriptBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
