//! Best-effort event broadcast.
//!
//! A single in-process `tokio::sync::broadcast` channel fans bookmark events
//! out to whoever is connected to the events WebSocket at that moment.
//! Nothing is persisted or replayed; a send with no receivers is not an
//! error, and a lagging receiver just drops events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Buffered events per receiver before lag kicks in.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events published to connected observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShelterEvent {
    /// Someone bookmarked a shelter.
    #[serde(rename_all = "camelCase")]
    ShelterBookmarked { shelter_name: String },
}

/// Handle for publishing and subscribing to [`ShelterEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<ShelterEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Fire-and-forget: having zero subscribers is normal and not an error.
    pub fn publish(&self, event: ShelterEvent) {
        let receivers = self.tx.send(event).unwrap_or(0);
        tracing::debug!(receivers, "event published");
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ShelterEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
