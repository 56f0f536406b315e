//! Shared service state
//!
//! Event broadcaster shared by the speech controller and the SSE endpoint.

use tgai_common::events::GuideEvent;
use tokio::sync::broadcast;

/// Events buffered per slow SSE subscriber before it starts lagging
const EVENT_BUFFER: usize = 100;

/// Shared state accessible by all components
pub struct SharedState {
    /// Event broadcaster for SSE events
    pub event_tx: broadcast::Sender<GuideEvent>,
}

impl SharedState {
    /// Create new shared state with default values
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { event_tx }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: GuideEvent) {
        // No receivers is OK
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<GuideEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let state = SharedState::new();
        let mut rx = state.subscribe_events();

        state.broadcast_event(GuideEvent::SpeechFinished {
            message_id: "msg1".to_string(),
            timestamp: tgai_common::time::now(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.message_id(), "msg1");
    }

    #[test]
    fn test_broadcast_without_subscribers_is_ok() {
        let state = SharedState::new();
        state.broadcast_event(GuideEvent::SpeechFinished {
            message_id: "msg1".to_string(),
            timestamp: tgai_common::time::now(),
        });
    }
}
