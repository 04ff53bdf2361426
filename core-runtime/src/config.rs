//! # Core Configuration Module
//!
//! Provides configuration management for the trend data client.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance holding every dependency and setting the client needs. Validation
//! is fail-fast: a config that would point the client at a malformed endpoint
//! or disable its cache never gets built.
//!
//! ## Dependencies
//!
//! - `HttpClient` - REST calls to the trend backend (desktop default: reqwest)
//! - `LiveConnector` - Live feed socket (desktop default: tokio-tungstenite)
//! - `Clock` - Cache freshness checks (default: system clock)
//! - `EventBus` - Optional, receives connection and fallback events
//!
//! When the `desktop-shims` feature is enabled, desktop adapters are injected
//! automatically if none are provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .base_url("http://localhost:8000")
//!     .ws_url("ws://localhost:8000/ws/live")
//!     .cache_ttl(Duration::from_secs(30))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{Clock, HttpClient, LiveConnector, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Default REST base URL of the trend backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default live feed endpoint.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws/live";

/// Default freshness window for cached payloads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable overriding the REST base URL.
pub const ENV_BASE_URL: &str = "TREND_API_BASE_URL";

/// Environment variable overriding the live feed URL.
pub const ENV_WS_URL: &str = "TREND_WS_URL";

/// Environment variable overriding the cache TTL, in seconds.
pub const ENV_CACHE_TTL_SECS: &str = "TREND_CACHE_TTL_SECS";

/// Reconnect policy for the live feed.
///
/// After the `n`-th consecutive failure the feed waits `n × backoff_step`
/// before trying again, for at most `max_attempts` reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Maximum number of reconnects before giving up
    pub max_attempts: u32,
    /// Linear backoff unit
    pub backoff_step: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_step: Duration::from_secs(3),
        }
    }
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts,
            backoff_step,
        }
    }

    /// Delay before reconnect number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }

    /// Whether reconnect number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt >= 1 && attempt <= self.max_attempts
    }
}

/// Core configuration for the trend data client.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// REST base URL, without trailing slash
    pub base_url: String,

    /// Live feed WebSocket URL
    pub ws_url: String,

    /// Timeout applied to every REST request
    pub request_timeout: Duration,

    /// How long a cached payload stays fresh
    pub cache_ttl: Duration,

    /// Live feed reconnect behaviour
    pub reconnect_policy: ReconnectPolicy,

    /// HTTP client for REST calls
    pub http_client: Arc<dyn HttpClient>,

    /// Connector for the live feed
    pub live_connector: Arc<dyn LiveConnector>,

    /// Time source for cache freshness
    pub clock: Arc<dyn Clock>,

    /// Optional event bus for connection/fallback notifications
    pub event_bus: Option<EventBus>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("base_url", &self.base_url)
            .field("ws_url", &self.ws_url)
            .field("request_timeout", &self.request_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field("reconnect_policy", &self.reconnect_policy)
            .field("http_client", &"HttpClient { ... }")
            .field("live_connector", &"LiveConnector { ... }")
            .field("clock", &"Clock { ... }")
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - `base_url` is an `http(s)://` URL
    /// - `ws_url` is a `ws(s)://` URL
    /// - Timeout, TTL and backoff step are non-zero
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        if !(self.ws_url.starts_with("ws://") || self.ws_url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "Live feed URL must start with ws:// or wss://, got '{}'",
                self.ws_url
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.cache_ttl.is_zero() {
            return Err(Error::Config(
                "Cache TTL must be greater than zero".to_string(),
            ));
        }

        if self.reconnect_policy.backoff_step.is_zero() {
            return Err(Error::Config(
                "Reconnect backoff step must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for REST calls. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Other hosts: inject a platform-native adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn live_connector_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "LiveConnector".to_string(),
        message: "LiveConnector implementation is required for the live feed. \
                 Desktop: enable the 'desktop-shims' feature to use TungsteniteConnector. \
                 Other hosts: inject a platform-native WebSocket adapter."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_live_connector() -> Result<Arc<dyn LiveConnector>> {
    use bridge_desktop::TungsteniteConnector;

    Ok(Arc::new(TungsteniteConnector::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_live_connector() -> Result<Arc<dyn LiveConnector>> {
    Err(live_connector_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    base_url: Option<String>,
    ws_url: Option<String>,
    request_timeout: Option<Duration>,
    cache_ttl: Option<Duration>,
    reconnect_policy: Option<ReconnectPolicy>,
    http_client: Option<Arc<dyn HttpClient>>,
    live_connector: Option<Arc<dyn LiveConnector>>,
    clock: Option<Arc<dyn Clock>>,
    event_bus: Option<EventBus>,
}

impl CoreConfigBuilder {
    /// Seeds a builder from process environment variables.
    ///
    /// Reads [`ENV_BASE_URL`], [`ENV_WS_URL`] and [`ENV_CACHE_TTL_SECS`];
    /// unset variables keep the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Seeds a builder from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            builder = builder.base_url(url);
        }

        if let Some(url) = lookup(ENV_WS_URL) {
            builder = builder.ws_url(url);
        }

        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_CACHE_TTL_SECS, raw
                ))
            })?;
            builder = builder.cache_ttl(Duration::from_secs(secs));
        }

        Ok(builder)
    }

    /// Sets the REST base URL. Trailing slashes are stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Sets the live feed URL.
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout.
    ///
    /// Default: 10 seconds
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the cache freshness window.
    ///
    /// Default: 30 seconds
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Sets the live feed reconnect policy.
    ///
    /// Default: 5 attempts, 3 second linear step
    pub fn reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect_policy = Some(policy);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the reqwest-based client is used when the
    /// `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the live feed connector.
    ///
    /// If not provided, the tokio-tungstenite connector is used when the
    /// `desktop-shims` feature is enabled.
    pub fn live_connector(mut self, connector: Arc<dyn LiveConnector>) -> Self {
        self.live_connector = Some(connector);
        self
    }

    /// Sets the clock used for cache freshness. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Attaches an event bus.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Missing bridges are filled with desktop defaults when available;
    /// otherwise an actionable [`Error::CapabilityMissing`] is returned.
    pub fn build(self) -> Result<CoreConfig> {
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let live_connector = match self.live_connector {
            Some(connector) => connector,
            None => provide_default_live_connector()?,
        };

        let config = CoreConfig {
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            ws_url: self.ws_url.unwrap_or_else(|| DEFAULT_WS_URL.to_string()),
            request_timeout,
            cache_ttl: self.cache_ttl.unwrap_or(DEFAULT_CACHE_TTL),
            reconnect_policy: self.reconnect_policy.unwrap_or_default(),
            http_client,
            live_connector,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_bus: self.event_bus,
        };

        config.validate()?;

        Ok(config)
    }
}
