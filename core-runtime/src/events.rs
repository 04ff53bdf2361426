//! # Event Bus System
//!
//! Broadcasts typed notifications from the trend client to any number of
//! listeners (connectivity badge, diagnostics panel, logs) using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! - **Event Types**: [`LiveEvent`] for live feed transitions and
//!   [`TrendsEvent`] for cache/fallback activity, wrapped in [`CoreEvent`]
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Receiver wrapper with optional filtering
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, LiveEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Live(LiveEvent::Connected {
//!     url: "ws://localhost:8000/ws/live".to_string(),
//! }))
//! .ok();
//!
//! assert!(matches!(rx.recv().await, Ok(CoreEvent::Live(LiveEvent::Connected { .. }))));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events; it can keep
//!   receiving.
//! - **`RecvError::Closed`**: all senders were dropped; treat as shutdown.
//!
//! Emitting with no subscribers returns an error that publishers ignore.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum published through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Live feed connection events
    Live(LiveEvent),
    /// REST fetch, cache and fallback events
    Trends(TrendsEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Live(e) => e.description(),
            CoreEvent::Trends(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Live(LiveEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Live(LiveEvent::ReconnectExhausted { .. }) => EventSeverity::Warning,
            CoreEvent::Trends(TrendsEvent::FallbackServed { .. }) => EventSeverity::Warning,
            CoreEvent::Live(LiveEvent::Connected { .. }) => EventSeverity::Info,
            CoreEvent::Live(LiveEvent::Disconnected { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Live Feed Events
// ============================================================================

/// Live feed connection lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LiveEvent {
    /// A connection attempt started. `attempt` is 0 for the initial connect.
    Connecting { url: String, attempt: u32 },
    /// The socket is open.
    Connected { url: String },
    /// The socket closed (peer close or local disconnect).
    Disconnected { url: String, reason: Option<String> },
    /// Connecting or reading failed.
    Error { url: String, message: String },
    /// A reconnect was scheduled.
    ReconnectScheduled { attempt: u32, delay_ms: u64 },
    /// All reconnect attempts were used up; the feed stays down.
    ReconnectExhausted { attempts: u32 },
    /// A `trending_update` replaced the live track list.
    TracksReplaced { count: usize },
}

impl LiveEvent {
    pub fn description(&self) -> &str {
        match self {
            LiveEvent::Connecting { .. } => "Connecting to live feed",
            LiveEvent::Connected { .. } => "Live feed connected",
            LiveEvent::Disconnected { .. } => "Live feed disconnected",
            LiveEvent::Error { .. } => "Live feed error",
            LiveEvent::ReconnectScheduled { .. } => "Live feed reconnect scheduled",
            LiveEvent::ReconnectExhausted { .. } => "Live feed reconnect attempts exhausted",
            LiveEvent::TracksReplaced { .. } => "Live track list replaced",
        }
    }
}

// ============================================================================
// Trend Fetch Events
// ============================================================================

/// REST-side activity of the trend client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum TrendsEvent {
    /// A fresh payload was fetched and cached under `key`.
    CacheRefreshed { key: String },
    /// The backend failed and synthetic data was returned for `key`.
    FallbackServed { key: String, reason: String },
}

impl TrendsEvent {
    pub fn description(&self) -> &str {
        match self {
            TrendsEvent::CacheRefreshed { .. } => "Trend payload refreshed",
            TrendsEvent::FallbackServed { .. } => "Fallback payload served",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel.
///
/// Cloning an `EventBus` yields another handle to the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified per-subscriber buffer.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let live_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Live(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned by `recv`/`try_recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive a matching event without waiting.
    ///
    /// Returns `None` if no matching event is currently buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> CoreEvent {
        CoreEvent::Live(LiveEvent::Connected {
            url: "ws://localhost:8000/ws/live".to_string(),
        })
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.emit(connected()).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        assert_eq!(bus.emit(connected()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), connected());
        assert_eq!(sub2.recv().await.unwrap(), connected());
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Trends(_)));

        bus.emit(connected()).ok();
        let fallback = CoreEvent::Trends(TrendsEvent::FallbackServed {
            key: "trending_25".to_string(),
            reason: "HTTP 500".to_string(),
        });
        bus.emit(fallback.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), fallback);
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for attempt in 1..=5 {
            bus.emit(CoreEvent::Live(LiveEvent::ReconnectScheduled {
                attempt,
                delay_ms: attempt as u64 * 3000,
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let error = CoreEvent::Live(LiveEvent::Error {
            url: "ws://x".to_string(),
            message: "refused".to_string(),
        });
        assert_eq!(error.severity(), EventSeverity::Error);

        let exhausted = CoreEvent::Live(LiveEvent::ReconnectExhausted { attempts: 5 });
        assert_eq!(exhausted.severity(), EventSeverity::Warning);

        assert_eq!(connected().severity(), EventSeverity::Info);

        let replaced = CoreEvent::Live(LiveEvent::TracksReplaced { count: 2 });
        assert_eq!(replaced.severity(), EventSeverity::Debug);
        assert_eq!(replaced.description(), "Live track list replaced");
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Trends(TrendsEvent::CacheRefreshed {
            key: "analytics".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Trends\""));
        assert!(json.contains("analytics"));

        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
