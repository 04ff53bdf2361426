//! # Live Trend Feed
//!
//! Holds one persistent WebSocket session to the trend backend and keeps an
//! in-memory list of the tracks it pushes.
//!
//! ## Overview
//!
//! [`LiveFeed::connect_live`] spawns a supervisor task that owns the
//! connection. The supervisor:
//! - parses every text frame as a [`LiveMessage`] and hands it to the
//!   message callback
//! - replaces the live track list on each `trending_update`
//! - reports every [`LiveConnectionState`] change to the status callback
//!   and, when configured, the event bus
//! - reconnects after a close or error with a linear backoff
//!   (`attempt × step`), giving up silently after the policy's attempt cap
//!
//! A successful open resets the attempt counter. [`LiveFeed::disconnect_live`]
//! cancels the supervisor, including any pending reconnect timer.
//!
//! ## Usage
//!
//! ```ignore
//! use core_trends::LiveFeed;
//!
//! let feed = LiveFeed::new(&config);
//! feed.connect_live(
//!     |message| println!("{} frame", message.kind.as_str()),
//!     |state| println!("live feed is {}", state),
//! );
//!
//! feed.send_ping();
//! let tracks = feed.live_tracks();
//!
//! feed.disconnect_live().await;
//! ```

use crate::models::{
    AnalyticsSnapshot, LiveConnectionState, LiveMessage, LiveMessageKind, Track, SOURCE_LIVE,
};
use crate::normalize::normalize_tracks;
use bridge_traits::live::{LiveConnection, LiveConnector};
use bridge_traits::time::Clock;
use core_runtime::config::{CoreConfig, ReconnectPolicy};
use core_runtime::events::{CoreEvent, EventBus, LiveEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Callback receiving every parsed live frame.
pub type MessageCallback = Arc<dyn Fn(LiveMessage) + Send + Sync>;

/// Callback receiving every connection state change.
pub type StatusCallback = Arc<dyn Fn(LiveConnectionState) + Send + Sync>;

const PING_FRAME: &str = r#"{"type":"ping"}"#;

/// State visible to both the feed handle and its supervisor.
struct Shared {
    tracks: RwLock<Vec<Track>>,
    state: RwLock<LiveConnectionState>,
}

/// The running supervisor of the current session.
struct ActiveSession {
    cancellation_token: CancellationToken,
    outgoing: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

/// Live feed client.
pub struct LiveFeed {
    connector: Arc<dyn LiveConnector>,
    ws_url: String,
    policy: ReconnectPolicy,
    clock: Arc<dyn Clock>,
    event_bus: Option<EventBus>,
    shared: Arc<Shared>,
    session: Mutex<Option<ActiveSession>>,
}

impl LiveFeed {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            connector: Arc::clone(&config.live_connector),
            ws_url: config.ws_url.clone(),
            policy: config.reconnect_policy,
            clock: Arc::clone(&config.clock),
            event_bus: config.event_bus.clone(),
            shared: Arc::new(Shared {
                tracks: RwLock::new(Vec::new()),
                state: RwLock::new(LiveConnectionState::Disconnected),
            }),
            session: Mutex::new(None),
        }
    }

    /// Starts the live session.
    ///
    /// Does nothing if a session is already running. Must be called from
    /// within a tokio runtime.
    pub fn connect_live<M, S>(&self, on_message: M, on_status: S)
    where
        M: Fn(LiveMessage) + Send + Sync + 'static,
        S: Fn(LiveConnectionState) + Send + Sync + 'static,
    {
        let mut session = self.lock_session();

        if let Some(active) = session.as_ref() {
            if !active.task.is_finished() {
                debug!("Live session already active");
                return;
            }
        }

        let cancellation_token = CancellationToken::new();
        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();

        let supervisor = Supervisor {
            connector: Arc::clone(&self.connector),
            url: self.ws_url.clone(),
            policy: self.policy,
            event_bus: self.event_bus.clone(),
            shared: Arc::clone(&self.shared),
            on_message: Arc::new(on_message),
            on_status: Arc::new(on_status),
            cancellation_token: cancellation_token.clone(),
            outgoing_rx,
        };

        let task = tokio::spawn(supervisor.run());

        *session = Some(ActiveSession {
            cancellation_token,
            outgoing,
            task,
        });

        info!("Live feed started for {}", self.ws_url);
    }

    /// Closes the session and cancels any pending reconnect.
    ///
    /// Safe to call when not connected.
    pub async fn disconnect_live(&self) {
        let active = self.lock_session().take();

        let Some(active) = active else {
            debug!("Live feed not running, nothing to disconnect");
            return;
        };

        active.cancellation_token.cancel();
        if let Err(e) = active.task.await {
            warn!("Live supervisor ended abnormally: {}", e);
        }

        set_state(&self.shared, LiveConnectionState::Disconnected);
        info!("Live feed disconnected");
    }

    /// Sends `{"type":"ping"}` over the open session.
    ///
    /// Dropped with a log line unless the feed is connected.
    pub fn send_ping(&self) {
        if self.state() != LiveConnectionState::Connected {
            debug!("Live feed not connected, ping dropped");
            return;
        }

        let session = self.lock_session();
        match session.as_ref() {
            Some(active) => {
                if active.outgoing.send(PING_FRAME.to_string()).is_err() {
                    debug!("Live supervisor gone, ping dropped");
                }
            }
            None => debug!("Live feed not running, ping dropped"),
        }
    }

    /// Snapshot of the live track list.
    pub fn live_tracks(&self) -> Vec<Track> {
        read(&self.shared.tracks).clone()
    }

    /// Aggregates over the live track list.
    pub fn live_analytics(&self) -> AnalyticsSnapshot {
        let tracks = read(&self.shared.tracks);
        AnalyticsSnapshot::from_tracks(&tracks, SOURCE_LIVE, self.clock.now())
    }

    pub fn state(&self) -> LiveConnectionState {
        *read(&self.shared.state)
    }

    /// Whether a supervisor task is currently running.
    pub fn is_active(&self) -> bool {
        self.lock_session()
            .as_ref()
            .map_or(false, |active| !active.task.is_finished())
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        if let Some(active) = self.lock_session().take() {
            active.cancellation_token.cancel();
        }
    }
}

/// How one connected session ended.
enum SessionEnd {
    Cancelled,
    Closed,
    Failed(String),
}

/// Owns the connection for the lifetime of one `connect_live` call.
struct Supervisor {
    connector: Arc<dyn LiveConnector>,
    url: String,
    policy: ReconnectPolicy,
    event_bus: Option<EventBus>,
    shared: Arc<Shared>,
    on_message: MessageCallback,
    on_status: StatusCallback,
    cancellation_token: CancellationToken,
    outgoing_rx: mpsc::UnboundedReceiver<String>,
}

impl Supervisor {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn run(mut self) {
        // 0 for the initial connect, then the 1-based reconnect number
        let mut attempt: u32 = 0;

        loop {
            self.transition(LiveConnectionState::Connecting);
            self.emit(LiveEvent::Connecting {
                url: self.url.clone(),
                attempt,
            });

            let connected = tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    self.closed_by_client();
                    return;
                }
                result = self.connector.connect(&self.url) => result,
            };

            match connected {
                Ok(mut connection) => {
                    attempt = 0;
                    info!("Live feed connected");
                    self.transition(LiveConnectionState::Connected);
                    self.emit(LiveEvent::Connected {
                        url: self.url.clone(),
                    });

                    match self.pump(connection.as_mut()).await {
                        SessionEnd::Cancelled => {
                            if let Err(e) = connection.close().await {
                                debug!("Close handshake failed: {}", e);
                            }
                            self.closed_by_client();
                            return;
                        }
                        SessionEnd::Closed => {
                            info!("Live feed closed by server");
                            self.transition(LiveConnectionState::Disconnected);
                            self.emit(LiveEvent::Disconnected {
                                url: self.url.clone(),
                                reason: None,
                            });
                        }
                        SessionEnd::Failed(message) => {
                            warn!("Live feed error: {}", message);
                            self.transition(LiveConnectionState::Error);
                            self.emit(LiveEvent::Error {
                                url: self.url.clone(),
                                message,
                            });
                        }
                    }
                }
                Err(e) => {
                    warn!("Live feed connect failed: {}", e);
                    self.transition(LiveConnectionState::Error);
                    self.emit(LiveEvent::Error {
                        url: self.url.clone(),
                        message: e.to_string(),
                    });
                }
            }

            attempt += 1;
            if !self.policy.allows(attempt) {
                warn!(
                    "Live feed gave up after {} reconnect attempts",
                    self.policy.max_attempts
                );
                self.transition(LiveConnectionState::Disconnected);
                self.emit(LiveEvent::ReconnectExhausted {
                    attempts: self.policy.max_attempts,
                });
                return;
            }

            let delay = self.policy.delay_for(attempt);
            debug!("Reconnect {} scheduled in {:?}", attempt, delay);
            self.emit(LiveEvent::ReconnectScheduled {
                attempt,
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            });

            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    self.closed_by_client();
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Moves frames until the session ends.
    async fn pump(&mut self, connection: &mut dyn LiveConnection) -> SessionEnd {
        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => return SessionEnd::Cancelled,
                outgoing = self.outgoing_rx.recv() => match outgoing {
                    Some(text) => {
                        if let Err(e) = connection.send(text).await {
                            warn!("Live feed send failed: {}", e);
                        }
                    }
                    // The feed handle is gone
                    None => return SessionEnd::Cancelled,
                },
                frame = connection.recv() => match frame {
                    Some(Ok(text)) => self.handle_frame(&text),
                    Some(Err(e)) => return SessionEnd::Failed(e.to_string()),
                    None => return SessionEnd::Closed,
                },
            }
        }
    }

    fn handle_frame(&self, text: &str) {
        let message = match LiveMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Ignoring live frame: {}", e);
                return;
            }
        };

        if message.kind == LiveMessageKind::TrendingUpdate {
            match message.data.as_array() {
                Some(items) => {
                    let tracks = normalize_tracks(items, SOURCE_LIVE);
                    let count = tracks.len();
                    *write(&self.shared.tracks) = tracks;
                    debug!("Live track list replaced with {} tracks", count);
                    self.emit(LiveEvent::TracksReplaced { count });
                }
                None => warn!("trending_update without a data array"),
            }
        }

        (self.on_message)(message);
    }

    fn closed_by_client(&self) {
        self.transition(LiveConnectionState::Disconnected);
        self.emit(LiveEvent::Disconnected {
            url: self.url.clone(),
            reason: Some("closed by client".to_string()),
        });
    }

    fn transition(&self, state: LiveConnectionState) {
        set_state(&self.shared, state);
        (self.on_status)(state);
    }

    fn emit(&self, event: LiveEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Live(event)).ok();
        }
    }
}

fn set_state(shared: &Shared, state: LiveConnectionState) {
    *write(&shared.state) = state;
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
