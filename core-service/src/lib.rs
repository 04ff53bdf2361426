//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, live feed
//! socket, clock) into the trend data client. Desktop apps typically enable
//! the `desktop-shims` feature, which fills in the `reqwest` and
//! `tokio-tungstenite` adapters from `bridge-desktop`; other hosts inject
//! their own through [`CoreConfig::builder`].

pub mod error;

pub use error::{CoreError, Result};

pub use bridge_traits::{Clock, HttpClient, LiveConnection, LiveConnector};
pub use core_runtime::config::{CoreConfig, CoreConfigBuilder, ReconnectPolicy};
pub use core_runtime::events::{CoreEvent, EventBus, EventStream, LiveEvent, TrendsEvent};
pub use core_trends::{
    AnalyticsSnapshot, HealthStatus, LiveConnectionState, LiveFeed, LiveMessage, SearchResult,
    Track, TrendClient, TrendingPayload,
};

use std::sync::Arc;
use tracing::info;

/// Everything a dashboard needs for its first paint.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub trending: Arc<TrendingPayload>,
    pub analytics: Arc<AnalyticsSnapshot>,
    pub health: HealthStatus,
}

impl DashboardSnapshot {
    /// True if any part was synthesized instead of fetched.
    pub fn is_degraded(&self) -> bool {
        self.trending.is_fallback()
            || self.analytics.source == core_trends::fallback::FALLBACK_ANALYTICS_SOURCE
            || !self.health.is_healthy()
    }
}

/// Primary façade exposed to host applications.
///
/// Cloning yields another handle to the same client, cache and live session.
#[derive(Clone)]
pub struct TrendService {
    config: Arc<CoreConfig>,
    client: Arc<TrendClient>,
    live: Arc<LiveFeed>,
}

impl TrendService {
    /// Create a new service from a built configuration.
    pub fn new(config: CoreConfig) -> Self {
        let client = Arc::new(TrendClient::new(&config));
        let live = Arc::new(LiveFeed::new(&config));

        info!(
            base_url = %config.base_url,
            ws_url = %config.ws_url,
            "Trend service initialized"
        );

        Self {
            config: Arc::new(config),
            client,
            live,
        }
    }

    /// Build a service from a configured builder.
    pub fn from_builder(builder: CoreConfigBuilder) -> Result<Self> {
        Ok(Self::new(builder.build()?))
    }

    /// The REST client.
    pub fn client(&self) -> &TrendClient {
        &self.client
    }

    /// The live feed.
    pub fn live(&self) -> &LiveFeed {
        &self.live
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Fetches trending tracks, analytics and backend health concurrently.
    pub async fn load_dashboard(&self, limit: usize) -> DashboardSnapshot {
        let (trending, analytics, health) = futures::join!(
            self.client.fetch_trending(limit),
            self.client.fetch_analytics(),
            self.client.check_health(),
        );

        DashboardSnapshot {
            trending,
            analytics,
            health,
        }
    }

    /// Tears down the live session.
    pub async fn shutdown(&self) {
        self.live.disconnect_live().await;
        info!("Trend service shut down");
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Reads `TREND_API_BASE_URL`, `TREND_WS_URL` and `TREND_CACHE_TTL_SECS`
/// from the environment and uses the desktop adapters.
///
/// ```no_run
/// # async fn example() -> core_service::Result<()> {
/// let service = core_service::bootstrap_desktop()?;
/// let trending = service.client().fetch_trending(25).await;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop() -> Result<TrendService> {
    let builder = CoreConfigBuilder::from_env()?;
    TrendService::from_builder(builder)
        .map_err(|err| match err {
            CoreError::Runtime(inner) => CoreError::InitializationFailed(inner.to_string()),
            other => other,
        })
}
