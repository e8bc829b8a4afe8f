//! Server event channel backing the SSE endpoint.
//!
//! A broadcast fan-out: producers call [`EventHub::notify`] and every
//! connected SSE subscriber receives the event. Publishing is best-effort;
//! with no subscribers the event is dropped silently, and a slow
//! subscriber that lags past the channel capacity loses the oldest events
//! rather than blocking producers.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

/// Event type published when the server comes up.
pub const EVENT_SERVER_START: &str = "server-start";
/// Event type published when a command fails server-side.
pub const EVENT_ERROR: &str = "error";
/// Event type sent to each SSE subscriber on connect.
pub const EVENT_CONNECTION: &str = "connection";

/// A server-side event pushed to SSE subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct ServerEvent {
    /// Event kind, e.g. "connection" or "system".
    #[serde(rename = "type")]
    pub event_type: String,
    pub message: String,
    /// RFC 3339 timestamp taken when the event was published.
    pub timestamp: String,
}

impl ServerEvent {
    pub fn new(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            message: message.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Broadcast hub for server events.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish a system event to all subscribers, best-effort.
    pub fn notify(&self, event_type: &str, message: impl Into<String>) {
        let event = ServerEvent::new(event_type, message);
        debug!(event_type = %event.event_type, "Publishing server event");
        // send fails only when there are no subscribers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_receives_published_event() {
        let hub = EventHub::new();
        let mut rx = hub.subscribe();
        hub.notify(EVENT_SERVER_START, "Server started");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "server-start");
        assert_eq!(event.message, "Server started");
        assert!(!event.timestamp.is_empty());
    }

    #[test]
    fn test_lifecycle_event_types_match_wire_names() {
        assert_eq!(EVENT_SERVER_START, "server-start");
        assert_eq!(EVENT_ERROR, "error");
        assert_eq!(EVENT_CONNECTION, "connection");
    }

    #[test]
    fn test_notify_without_subscribers_is_silent() {
        let hub = EventHub::new();
        hub.notify("system", "nobody listening");
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_each_receive() {
        let hub = EventHub::new();
        let mut rx1 = hub.subscribe();
        let mut rx2 = hub.subscribe();
        hub.notify("system", "fan-out");

        assert_eq!(rx1.recv().await.unwrap().message, "fan-out");
        assert_eq!(rx2.recv().await.unwrap().message, "fan-out");
    }
}
