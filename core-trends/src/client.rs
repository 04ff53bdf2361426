//! Trend backend REST client
//!
//! Fetches trending tracks, analytics and search results from the trend
//! backend, caching the first two by request key.
//!
//! ## API Endpoints
//!
//! - **Trending**: `GET {base}/trending?limit={n}`
//! - **Analytics**: `GET {base}/analytics`
//! - **Search**: `GET {base}/search?query={q}&limit={n}`
//! - **Health**: `GET {base}/health`
//!
//! ## Failure Policy
//!
//! No public operation returns an error. Trending and analytics fall back to
//! synthesized data (never cached), search returns an empty result carrying
//! the error message, and health reports `unreachable`.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_trends::TrendClient;
//!
//! let config = CoreConfig::builder().build()?;
//! let client = TrendClient::new(&config);
//!
//! let trending = client.fetch_trending(25).await;
//! if trending.is_fallback() {
//!     println!("backend down, showing placeholders");
//! }
//! ```

use crate::cache::TtlCache;
use crate::error::{Result, TrendError};
use crate::fallback::FallbackGenerator;
use crate::models::{
    AnalyticsSnapshot, HealthStatus, SearchResult, TrendingMetadata, TrendingPayload, SOURCE_API,
};
use crate::normalize::normalize_tracks;
use bridge_traits::http::{HttpClient, HttpRequest};
use bridge_traits::time::Clock;
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, TrendsEvent};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of trending tracks requested.
pub const DEFAULT_TRENDING_LIMIT: usize = 25;

/// Default number of search results requested.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Shortest query (after trimming) that is sent to the backend.
pub const MIN_QUERY_LEN: usize = 2;

const ANALYTICS_KEY: &str = "analytics";

/// Longest slice of an error response body kept in logs and events.
const ERROR_BODY_EXCERPT: usize = 200;

fn trending_key(limit: usize) -> String {
    format!("trending_{}", limit)
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    tracks: Vec<Value>,
    #[serde(default)]
    metadata: Option<TrendingResponseMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct TrendingResponseMetadata {
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyticsResponse {
    #[serde(default)]
    content_distribution: Option<Value>,
    #[serde(default)]
    market_overview: Option<MarketOverview>,
    #[serde(default)]
    data_source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct MarketOverview {
    #[serde(default)]
    total_tracks_analyzed: Option<u64>,
    #[serde(default)]
    unique_artists: Option<u64>,
    #[serde(default)]
    avg_popularity_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    tracks: Vec<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// REST client for the trend backend.
pub struct TrendClient {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    request_timeout: Duration,
    clock: Arc<dyn Clock>,
    trending_cache: TtlCache<TrendingPayload>,
    analytics_cache: TtlCache<AnalyticsSnapshot>,
    fallback: FallbackGenerator,
    event_bus: Option<EventBus>,
}

impl TrendClient {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            http_client: Arc::clone(&config.http_client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_timeout: config.request_timeout,
            clock: Arc::clone(&config.clock),
            trending_cache: TtlCache::new(config.cache_ttl, Arc::clone(&config.clock)),
            analytics_cache: TtlCache::new(config.cache_ttl, Arc::clone(&config.clock)),
            fallback: FallbackGenerator::new(),
            event_bus: config.event_bus.clone(),
        }
    }

    /// Returns up to `limit` trending tracks.
    ///
    /// A fresh cache entry under `trending_{limit}` is returned as is. On any
    /// backend failure exactly `limit` fallback tracks are returned and
    /// nothing is cached.
    pub async fn fetch_trending(&self, limit: usize) -> Arc<TrendingPayload> {
        let key = trending_key(limit);

        if let Some(cached) = self.trending_cache.get(&key) {
            return cached;
        }

        let issued_at = self.clock.now();
        match self.request_trending(limit).await {
            Ok(payload) => {
                info!("Fetched {} trending tracks", payload.tracks.len());
                let payload = Arc::new(payload);
                if self.trending_cache.insert(&key, Arc::clone(&payload), issued_at) {
                    self.emit(TrendsEvent::CacheRefreshed { key });
                }
                payload
            }
            Err(e) => {
                warn!("Trending fetch failed, serving fallback: {}", e);
                self.emit(TrendsEvent::FallbackServed {
                    key,
                    reason: e.to_string(),
                });
                Arc::new(self.fallback.trending(limit, self.clock.now()))
            }
        }
    }

    /// Returns the market analytics snapshot, or the fixed fallback
    /// distribution if the backend fails.
    pub async fn fetch_analytics(&self) -> Arc<AnalyticsSnapshot> {
        if let Some(cached) = self.analytics_cache.get(ANALYTICS_KEY) {
            return cached;
        }

        let issued_at = self.clock.now();
        match self.request_analytics().await {
            Ok(snapshot) => {
                info!(
                    "Fetched analytics covering {} languages",
                    snapshot.by_language.len()
                );
                let snapshot = Arc::new(snapshot);
                if self
                    .analytics_cache
                    .insert(ANALYTICS_KEY, Arc::clone(&snapshot), issued_at)
                {
                    self.emit(TrendsEvent::CacheRefreshed {
                        key: ANALYTICS_KEY.to_string(),
                    });
                }
                snapshot
            }
            Err(e) => {
                warn!("Analytics fetch failed, serving fallback: {}", e);
                self.emit(TrendsEvent::FallbackServed {
                    key: ANALYTICS_KEY.to_string(),
                    reason: e.to_string(),
                });
                Arc::new(self.fallback.analytics(self.clock.now()))
            }
        }
    }

    /// Searches the backend catalogue.
    ///
    /// Queries shorter than [`MIN_QUERY_LEN`] after trimming return an empty
    /// result without a request. Failures return an empty result with
    /// `error` set.
    pub async fn search(&self, query: &str, limit: usize) -> SearchResult {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            debug!("Search query '{}' too short, skipping request", query);
            return SearchResult::empty(query);
        }

        match self.request_search(query, limit).await {
            Ok(result) => {
                debug!("Search '{}' returned {} tracks", query, result.total);
                result
            }
            Err(e) => {
                warn!("Search '{}' failed: {}", query, e);
                SearchResult::failed(query, e.to_string())
            }
        }
    }

    /// Queries `/health`. Any failure reports `api_status = "unreachable"`.
    pub async fn check_health(&self) -> HealthStatus {
        match self.get_json::<HealthStatus>("/health").await {
            Ok(status) => status,
            Err(e) => {
                warn!("Health check failed: {}", e);
                HealthStatus::unreachable()
            }
        }
    }

    /// Drops every cached payload.
    pub fn clear_cache(&self) {
        self.trending_cache.clear();
        self.analytics_cache.clear();
        debug!("Trend cache cleared");
    }

    /// Number of cached payloads, fresh or stale.
    pub fn cache_len(&self) -> usize {
        self.trending_cache.len() + self.analytics_cache.len()
    }

    async fn request_trending(&self, limit: usize) -> Result<TrendingPayload> {
        let response: TrendingResponse = self
            .get_json(&format!("/trending?limit={}", limit))
            .await?;

        if response.success == Some(false) {
            return Err(TrendError::MalformedPayload(
                "trending response reported success = false".to_string(),
            ));
        }

        let tracks = normalize_tracks(&response.tracks, SOURCE_API);
        if tracks.is_empty() {
            return Err(TrendError::MalformedPayload(
                "trending response has no tracks".to_string(),
            ));
        }

        let metadata = response.metadata.unwrap_or_default();
        Ok(TrendingPayload {
            success: true,
            metadata: TrendingMetadata {
                total_tracks: tracks.len(),
                source: metadata.source.unwrap_or_else(|| SOURCE_API.to_string()),
                timestamp: self.clock.now(),
                note: metadata.note,
            },
            tracks,
        })
    }

    async fn request_analytics(&self) -> Result<AnalyticsSnapshot> {
        let response: AnalyticsResponse = self.get_json("/analytics").await?;

        let distribution = match response.content_distribution {
            Some(Value::Object(distribution)) => distribution,
            _ => {
                return Err(TrendError::MalformedPayload(
                    "analytics response has no content_distribution object".to_string(),
                ))
            }
        };

        let by_language = counts(distribution.get("by_language"));
        let by_genre = counts(distribution.get("by_genre"));
        let overview = response.market_overview.unwrap_or_default();

        Ok(AnalyticsSnapshot {
            total_tracks: overview
                .total_tracks_analyzed
                .unwrap_or_else(|| by_language.values().sum()),
            unique_artists: overview.unique_artists.unwrap_or(0),
            avg_popularity: overview.avg_popularity_score.unwrap_or(0.0),
            source: response.data_source.unwrap_or_else(|| SOURCE_API.to_string()),
            timestamp: self.clock.now(),
            by_language,
            by_genre,
        })
    }

    async fn request_search(&self, query: &str, limit: usize) -> Result<SearchResult> {
        let path = format!(
            "/search?query={}&limit={}",
            urlencoding::encode(query),
            limit
        );
        let response: SearchResponse = self.get_json(&path).await?;

        if response.success == Some(false) {
            let error = response
                .error
                .unwrap_or_else(|| "search reported success = false".to_string());
            return Ok(SearchResult::failed(query, error));
        }

        let mut tracks = normalize_tracks(&response.tracks, SOURCE_API);
        tracks.truncate(limit);
        Ok(SearchResult::found(query, tracks))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let request = HttpRequest::get(url)
            .header("Accept", "application/json")
            .timeout(self.request_timeout);

        let response = self.http_client.execute(request).await.map_err(|e| {
            if e.is_transport() {
                TrendError::Network(e.to_string())
            } else {
                TrendError::Bridge(e)
            }
        })?;

        if !response.is_success() {
            return Err(TrendError::HttpStatus {
                status: response.status,
                body: excerpt(&String::from_utf8_lossy(&response.body)),
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }

    fn emit(&self, event: TrendsEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Trends(event)).ok();
        }
    }
}

fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(ERROR_BODY_EXCERPT).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Reads a `{name: count}` object, ignoring non-numeric counts.
fn counts(value: Option<&Value>) -> BTreeMap<String, u64> {
    let Some(Value::Object(map)) = value else {
        return BTreeMap::new();
    };

    map.iter()
        .filter_map(|(key, count)| {
            let count = count
                .as_u64()
                .or_else(|| count.as_f64().filter(|c| *c >= 0.0).map(|c| c as u64))?;
            Some((key.clone(), count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use bridge_traits::live::{LiveConnection, LiveConnector};
    use bridge_traits::time::ManualClock;
    use bytes::Bytes;
    use mockall::mock;
    use serde_json::json;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    struct NoopConnector;

    #[async_trait]
    impl LiveConnector for NoopConnector {
        async fn connect(&self, _url: &str) -> BridgeResult<Box<dyn LiveConnection>> {
            Err(BridgeError::NotAvailable("live".to_string()))
        }
    }

    fn response(status: u16, body: Value) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn client_with(http: MockHttpClient, clock: Arc<ManualClock>) -> TrendClient {
        let config = CoreConfig::builder()
            .base_url("http://trends.test")
            .http_client(Arc::new(http))
            .live_connector(Arc::new(NoopConnector))
            .clock(clock)
            .build()
            .unwrap();
        TrendClient::new(&config)
    }

    /// Holds each request until the test releases its response.
    #[derive(Default)]
    struct GatedHttpClient {
        pending: std::sync::Mutex<Vec<tokio::sync::oneshot::Sender<HttpResponse>>>,
    }

    impl GatedHttpClient {
        fn waiting(&self) -> usize {
            self.pending.lock().unwrap().len()
        }

        fn release(&self, index: usize, response: HttpResponse) {
            let gate = self.pending.lock().unwrap().remove(index);
            gate.send(response).unwrap();
        }
    }

    #[async_trait]
    impl HttpClient for GatedHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            let (tx, rx) = tokio::sync::oneshot::channel();
            self.pending.lock().unwrap().push(tx);
            rx.await.map_err(|_| BridgeError::OperationFailed("gate dropped".to_string()))
        }
    }

    fn trending_with(id: &str) -> HttpResponse {
        response(
            200,
            json!({"success": true, "tracks": [{"track_id": id, "track_name": id}]}),
        )
    }

    fn trending_body() -> Value {
        json!({
            "success": true,
            "tracks": [
                {
                    "track_id": "t1",
                    "track_name": "Tum Hi Ho",
                    "artist": "Arijit Singh",
                    "popularity": 92
                },
                {
                    "id": "t2",
                    "song": "Lover",
                    "primary_artists": "Diljit Dosanjh",
                    "language": "punjabi"
                },
                "garbage"
            ],
            "metadata": {"source": "fresh_api_call"}
        })
    }

    #[tokio::test]
    async fn test_fetch_trending_caches_within_ttl() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.url == "http://trends.test/trending?limit=25")
            .times(1)
            .returning(|_| Ok(response(200, trending_body())));

        let clock = Arc::new(ManualClock::default());
        let client = client_with(http, clock.clone());

        let first = client.fetch_trending(25).await;
        clock.advance(Duration::from_secs(10));
        let second = client.fetch_trending(25).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.tracks.len(), 2);
        assert_eq!(first.tracks[0].id, "t1");
        assert_eq!(first.tracks[1].genre, "punjabi");
        assert_eq!(first.metadata.source, "fresh_api_call");
        assert!(!first.is_fallback());
        assert_eq!(client.cache_len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_trending_refetches_after_ttl() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(2)
            .returning(|_| Ok(response(200, trending_body())));

        let clock = Arc::new(ManualClock::default());
        let client = client_with(http, clock.clone());

        let first = client.fetch_trending(25).await;
        clock.advance(Duration::from_secs(31));
        let second = client.fetch_trending(25).await;

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_fetch_trending_server_error_serves_fallback() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(2)
            .returning(|_| Ok(response(500, json!({"detail": "boom"}))));

        let client = client_with(http, Arc::new(ManualClock::default()));

        let payload = client.fetch_trending(10).await;
        assert_eq!(payload.tracks.len(), 10);
        assert!(payload.tracks.iter().all(|t| t.source == "fallback"));
        assert!(payload.is_fallback());

        // Fallbacks are not cached, so the next call hits the backend again
        assert_eq!(client.cache_len(), 0);
        let again = client.fetch_trending(10).await;
        assert_eq!(again.tracks.len(), 10);
    }

    #[tokio::test]
    async fn test_fetch_trending_empty_list_serves_fallback() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, json!({"success": true, "tracks": []}))));

        let client = client_with(http, Arc::new(ManualClock::default()));
        let payload = client.fetch_trending(5).await;

        assert!(payload.is_fallback());
        assert_eq!(payload.tracks.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_trending_network_error_serves_fallback() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::ConnectionFailed("refused".to_string())));

        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let config = CoreConfig::builder()
            .http_client(Arc::new(http))
            .live_connector(Arc::new(NoopConnector))
            .clock(Arc::new(ManualClock::default()))
            .event_bus(bus)
            .build()
            .unwrap();
        let client = TrendClient::new(&config);

        let payload = client.fetch_trending(3).await;
        assert_eq!(payload.tracks.len(), 3);

        match events.try_recv().unwrap() {
            CoreEvent::Trends(TrendsEvent::FallbackServed { key, reason }) => {
                assert_eq!(key, "trending_3");
                assert!(reason.contains("Network error"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_older_fetch_does_not_replace_newer() {
        let http = Arc::new(GatedHttpClient::default());
        let clock = Arc::new(ManualClock::default());
        let config = CoreConfig::builder()
            .http_client(http.clone())
            .live_connector(Arc::new(NoopConnector))
            .clock(clock.clone())
            .build()
            .unwrap();
        let client = Arc::new(TrendClient::new(&config));

        let older = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.fetch_trending(10).await }
        });
        while http.waiting() < 1 {
            tokio::task::yield_now().await;
        }

        clock.advance(Duration::from_secs(1));
        let newer = tokio::spawn({
            let client = Arc::clone(&client);
            async move { client.fetch_trending(10).await }
        });
        while http.waiting() < 2 {
            tokio::task::yield_now().await;
        }

        // The newer request answers first, the older one last
        http.release(1, trending_with("newer"));
        assert_eq!(newer.await.unwrap().tracks[0].id, "newer");
        http.release(0, trending_with("older"));
        assert_eq!(older.await.unwrap().tracks[0].id, "older");

        let cached = client.fetch_trending(10).await;
        assert_eq!(cached.tracks[0].id, "newer");
        assert_eq!(http.waiting(), 0);
    }

    #[tokio::test]
    async fn test_error_body_is_truncated_in_fallback_reason() {
        let page = "<html>".repeat(500);
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(move |_| {
            Ok(HttpResponse {
                status: 502,
                headers: HashMap::new(),
                body: Bytes::from(page.clone()),
            })
        });

        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let config = CoreConfig::builder()
            .http_client(Arc::new(http))
            .live_connector(Arc::new(NoopConnector))
            .clock(Arc::new(ManualClock::default()))
            .event_bus(bus)
            .build()
            .unwrap();
        let client = TrendClient::new(&config);

        assert!(client.fetch_trending(5).await.is_fallback());

        match events.try_recv().unwrap() {
            CoreEvent::Trends(TrendsEvent::FallbackServed { reason, .. }) => {
                assert!(reason.starts_with("HTTP 502: <html>"));
                assert!(reason.ends_with("..."));
                assert!(reason.len() < 300);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_excerpt_keeps_short_bodies() {
        assert_eq!(excerpt(r#"{"detail":"Not Found"}"#), r#"{"detail":"Not Found"}"#);
        assert_eq!(excerpt(&"é".repeat(250)).chars().count(), 203);
    }

    #[tokio::test]
    async fn test_fetch_analytics_parses_distribution() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.url.ends_with("/analytics"))
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    json!({
                        "market_overview": {
                            "total_tracks_analyzed": 40,
                            "unique_artists": 22,
                            "avg_popularity_score": 77.5
                        },
                        "content_distribution": {
                            "by_language": {"hindi": 30, "tamil": 10},
                            "by_genre": {"bollywood": 30, "south_indian": 10}
                        }
                    }),
                ))
            });

        let client = client_with(http, Arc::new(ManualClock::default()));

        let first = client.fetch_analytics().await;
        let second = client.fetch_analytics().await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.total_tracks, 40);
        assert_eq!(first.unique_artists, 22);
        assert_eq!(first.avg_popularity, 77.5);
        assert_eq!(first.by_language.get("tamil"), Some(&10));
        assert_eq!(first.source, SOURCE_API);
    }

    #[tokio::test]
    async fn test_fetch_analytics_without_distribution_serves_fallback() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, json!({"market_overview": {}}))));

        let client = client_with(http, Arc::new(ManualClock::default()));
        let snapshot = client.fetch_analytics().await;

        assert_eq!(snapshot.source, "fallback_analytics");
        assert_eq!(snapshot.by_language.get("hindi"), Some(&60));
        assert_eq!(client.cache_len(), 0);
    }

    #[tokio::test]
    async fn test_search_short_query_skips_request() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(0);

        let client = client_with(http, Arc::new(ManualClock::default()));

        let result = client.search("a", 20).await;
        assert!(result.tracks.is_empty());
        assert_eq!(result.total, 0);
        assert!(result.error.is_none());

        let padded = client.search("  b  ", 20).await;
        assert_eq!(padded.total, 0);
    }

    #[tokio::test]
    async fn test_search_encodes_query_and_limits() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|req| req.url == "http://trends.test/search?query=arijit%20singh&limit=1")
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    json!({
                        "success": true,
                        "tracks": [{"id": "s1", "song": "Channa Mereya"}, {"id": "s2"}]
                    }),
                ))
            });

        let client = client_with(http, Arc::new(ManualClock::default()));
        let result = client.search(" arijit singh ", 1).await;

        assert!(result.success);
        assert_eq!(result.query, "arijit singh");
        assert_eq!(result.total, 1);
        assert_eq!(result.tracks[0].name, "Channa Mereya");
    }

    #[tokio::test]
    async fn test_search_failure_returns_error_field() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Err(BridgeError::Timeout("10s".to_string())));

        let client = client_with(http, Arc::new(ManualClock::default()));
        let result = client.search("kesariya", 20).await;

        assert!(!result.success);
        assert!(result.tracks.is_empty());
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_check_health() {
        let mut http = MockHttpClient::new();
        let mut seq = mockall::Sequence::new();
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(response(
                    200,
                    json!({
                        "api_status": "healthy",
                        "jiosaavn_api": "healthy",
                        "websocket_connections": 3
                    }),
                ))
            });
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(BridgeError::ConnectionFailed("refused".to_string())));

        let client = client_with(http, Arc::new(ManualClock::default()));

        let healthy = client.check_health().await;
        assert!(healthy.is_healthy());
        assert_eq!(healthy.websocket_connections, Some(3));

        let down = client.check_health().await;
        assert_eq!(down.api_status, "unreachable");
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(2)
            .returning(|_| Ok(response(200, trending_body())));

        let client = client_with(http, Arc::new(ManualClock::default()));

        client.fetch_trending(25).await;
        assert_eq!(client.cache_len(), 1);

        client.clear_cache();
        assert_eq!(client.cache_len(), 0);

        client.fetch_trending(25).await;
    }
}
