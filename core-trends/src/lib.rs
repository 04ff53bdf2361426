//! # Trend Data Access
//!
//! Client side of the music trend backend: REST fetches with a TTL cache,
//! the live WebSocket feed, track normalization and placeholder data for
//! when the backend is down.
//!
//! ## Components
//!
//! - [`TrendClient`] - trending, analytics, search and health over HTTP
//! - [`LiveFeed`] - persistent push channel with linear-backoff reconnects
//! - [`FallbackGenerator`] - synthetic trending lists and analytics
//! - [`normalize`] - folds backend field variants into [`Track`]
//! - [`cache::TtlCache`] - age-based payload cache
//!
//! Both [`TrendClient`] and [`LiveFeed`] are built from a
//! [`core_runtime::config::CoreConfig`], which supplies the bridges, URLs,
//! cache TTL and reconnect policy.

pub mod cache;
pub mod client;
pub mod error;
pub mod fallback;
pub mod live;
pub mod models;
pub mod normalize;

pub use client::TrendClient;
pub use error::{Result, TrendError};
pub use fallback::FallbackGenerator;
pub use live::LiveFeed;
pub use models::{
    AnalyticsSnapshot, HealthStatus, LiveConnectionState, LiveMessage, LiveMessageKind,
    SearchResult, Track, TrendingMetadata, TrendingPayload,
};
