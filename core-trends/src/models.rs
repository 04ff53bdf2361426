//! Domain models shared by the REST client and the live feed.

use crate::error::{Result, TrendError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Source tag of tracks returned by the REST backend.
pub const SOURCE_API: &str = "api";
/// Source tag of tracks pushed over the live feed.
pub const SOURCE_LIVE: &str = "live";
/// Source tag of synthesized tracks.
pub const SOURCE_FALLBACK: &str = "fallback";

/// A track in the canonical shape, whatever field names the backend used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    /// Popularity score, 0-100
    pub popularity: u8,
    pub play_count: u64,
    pub duration_ms: Option<u64>,
    pub image_url: Option<String>,
    pub preview_url: Option<String>,
    pub language: String,
    pub genre: String,
    pub is_trending: bool,
    /// `api`, `live`, `fallback`, or whatever tag the backend supplied
    pub source: String,
}

impl Track {
    /// Artist names joined for display.
    pub fn artist_display(&self) -> String {
        self.artists.join(", ")
    }

    pub fn is_fallback(&self) -> bool {
        self.source == SOURCE_FALLBACK
    }
}

/// Metadata attached to a trending list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingMetadata {
    pub total_tracks: usize,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

/// Result of `fetch_trending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingPayload {
    pub success: bool,
    pub tracks: Vec<Track>,
    pub metadata: TrendingMetadata,
}

impl TrendingPayload {
    /// True when the tracks were synthesized instead of fetched.
    pub fn is_fallback(&self) -> bool {
        self.metadata.source == crate::fallback::FALLBACK_TRENDING_SOURCE
    }
}

/// Aggregate view over a set of tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub by_language: BTreeMap<String, u64>,
    pub by_genre: BTreeMap<String, u64>,
    pub total_tracks: u64,
    pub unique_artists: u64,
    pub avg_popularity: f64,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl AnalyticsSnapshot {
    /// Computes the aggregates of `tracks`.
    ///
    /// Average popularity is rounded to one decimal; an empty list averages 0.
    pub fn from_tracks(
        tracks: &[Track],
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut by_language = BTreeMap::new();
        let mut by_genre = BTreeMap::new();
        let mut artists = HashSet::new();
        let mut popularity_sum = 0u64;

        for track in tracks {
            *by_language.entry(track.language.clone()).or_insert(0) += 1;
            *by_genre.entry(track.genre.clone()).or_insert(0) += 1;
            popularity_sum += u64::from(track.popularity);
            for artist in &track.artists {
                artists.insert(artist.as_str());
            }
        }

        let avg_popularity = if tracks.is_empty() {
            0.0
        } else {
            let raw = popularity_sum as f64 / tracks.len() as f64;
            (raw * 10.0).round() / 10.0
        };

        Self {
            by_language,
            by_genre,
            total_tracks: tracks.len() as u64,
            unique_artists: artists.len() as u64,
            avg_popularity,
            source: source.into(),
            timestamp,
        }
    }

    /// The `n` largest languages, largest first. Ties sort by name.
    pub fn top_languages(&self, n: usize) -> Vec<(String, u64)> {
        top_entries(&self.by_language, n)
    }

    /// The `n` largest genres, largest first. Ties sort by name.
    pub fn top_genres(&self, n: usize) -> Vec<(String, u64)> {
        top_entries(&self.by_genre, n)
    }

    /// Number of distinct languages present.
    pub fn market_diversity(&self) -> usize {
        self.by_language.values().filter(|count| **count > 0).count()
    }
}

fn top_entries(counts: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .iter()
        .map(|(key, count)| (key.clone(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

/// Result of `search`. Never an error: failures carry `error` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub success: bool,
    pub tracks: Vec<Track>,
    pub total: usize,
    pub query: String,
    pub error: Option<String>,
}

impl SearchResult {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            success: true,
            tracks: Vec::new(),
            total: 0,
            query: query.into(),
            error: None,
        }
    }

    pub fn failed(query: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            tracks: Vec::new(),
            total: 0,
            query: query.into(),
            error: Some(error.into()),
        }
    }

    pub fn found(query: impl Into<String>, tracks: Vec<Track>) -> Self {
        Self {
            success: true,
            total: tracks.len(),
            tracks,
            query: query.into(),
            error: None,
        }
    }
}

/// Backend health as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub api_status: String,
    #[serde(default = "unknown_status")]
    pub jiosaavn_api: String,
    #[serde(default)]
    pub websocket_connections: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

impl HealthStatus {
    /// Status reported when the backend cannot be reached at all.
    pub fn unreachable() -> Self {
        Self {
            api_status: "unreachable".to_string(),
            jiosaavn_api: unknown_status(),
            websocket_connections: None,
            timestamp: None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.api_status == "healthy"
    }
}

/// Connection state of the live feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl fmt::Display for LiveConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LiveConnectionState::Connecting => "connecting",
            LiveConnectionState::Connected => "connected",
            LiveConnectionState::Disconnected => "disconnected",
            LiveConnectionState::Error => "error",
        };
        f.write_str(label)
    }
}

/// The `type` discriminator of a live feed frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiveMessageKind {
    TrendingUpdate,
    InitialData,
    Heartbeat,
    Pong,
    Other(String),
}

impl LiveMessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            LiveMessageKind::TrendingUpdate => "trending_update",
            LiveMessageKind::InitialData => "initial_data",
            LiveMessageKind::Heartbeat => "heartbeat",
            LiveMessageKind::Pong => "pong",
            LiveMessageKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for LiveMessageKind {
    fn from(kind: &str) -> Self {
        match kind {
            "trending_update" => LiveMessageKind::TrendingUpdate,
            "initial_data" => LiveMessageKind::InitialData,
            "heartbeat" => LiveMessageKind::Heartbeat,
            "pong" => LiveMessageKind::Pong,
            other => LiveMessageKind::Other(other.to_string()),
        }
    }
}

/// A parsed live feed frame: `{type, data, timestamp?}`.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveMessage {
    pub kind: LiveMessageKind,
    /// `Value::Null` when the frame carried no `data`
    pub data: Value,
    pub timestamp: Option<String>,
}

impl LiveMessage {
    /// Parses a text frame. The frame must be a JSON object with a string `type`.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(mut object) = value else {
            return Err(TrendError::MalformedPayload(
                "live frame is not a JSON object".to_string(),
            ));
        };

        let kind = match object.get("type").and_then(Value::as_str) {
            Some(kind) => LiveMessageKind::from(kind),
            None => {
                return Err(TrendError::MalformedPayload(
                    "live frame has no string `type`".to_string(),
                ))
            }
        };

        let data = object.remove("data").unwrap_or(Value::Null);
        let timestamp = object
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            kind,
            data,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(id: &str, artist: &str, language: &str, genre: &str, popularity: u8) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Song {}", id),
            artists: vec![artist.to_string()],
            album: "Album".to_string(),
            popularity,
            play_count: 1_000,
            duration_ms: None,
            image_url: None,
            preview_url: None,
            language: language.to_string(),
            genre: genre.to_string(),
            is_trending: popularity > 80,
            source: SOURCE_API.to_string(),
        }
    }

    #[test]
    fn test_analytics_from_tracks() {
        let tracks = vec![
            track("1", "Arijit Singh", "hindi", "bollywood", 90),
            track("2", "Arijit Singh", "hindi", "remix", 85),
            track("3", "Diljit Dosanjh", "punjabi", "punjabi", 70),
        ];

        let snapshot = AnalyticsSnapshot::from_tracks(&tracks, SOURCE_LIVE, Utc::now());

        assert_eq!(snapshot.total_tracks, 3);
        assert_eq!(snapshot.unique_artists, 2);
        assert_eq!(snapshot.by_language.get("hindi"), Some(&2));
        assert_eq!(snapshot.by_genre.get("remix"), Some(&1));
        assert_eq!(snapshot.avg_popularity, 81.7);
        assert_eq!(snapshot.market_diversity(), 2);
        assert_eq!(snapshot.top_languages(1), vec![("hindi".to_string(), 2)]);
    }

    #[test]
    fn test_analytics_from_no_tracks() {
        let snapshot = AnalyticsSnapshot::from_tracks(&[], SOURCE_LIVE, Utc::now());
        assert_eq!(snapshot.total_tracks, 0);
        assert_eq!(snapshot.avg_popularity, 0.0);
        assert!(snapshot.top_genres(3).is_empty());
    }

    #[test]
    fn test_live_message_parse() {
        let text = json!({
            "type": "trending_update",
            "data": [{"track_id": "t1"}],
            "timestamp": "2025-01-01T00:00:00"
        })
        .to_string();

        let message = LiveMessage::parse(&text).unwrap();
        assert_eq!(message.kind, LiveMessageKind::TrendingUpdate);
        assert!(message.data.is_array());
        assert_eq!(message.timestamp.as_deref(), Some("2025-01-01T00:00:00"));

        let other = LiveMessage::parse(r#"{"type":"market_pulse"}"#).unwrap();
        assert_eq!(other.kind.as_str(), "market_pulse");
        assert_eq!(other.data, Value::Null);
    }

    #[test]
    fn test_live_message_rejects_bad_frames() {
        assert!(matches!(LiveMessage::parse("not json"), Err(TrendError::Json(_))));
        assert!(matches!(
            LiveMessage::parse("[1, 2]"),
            Err(TrendError::MalformedPayload(_))
        ));
        assert!(matches!(
            LiveMessage::parse(r#"{"data": []}"#),
            Err(TrendError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_health_status_deserialize_defaults() {
        let status: HealthStatus =
            serde_json::from_value(json!({"api_status": "healthy"})).unwrap();
        assert!(status.is_healthy());
        assert_eq!(status.jiosaavn_api, "unknown");
        assert!(!HealthStatus::unreachable().is_healthy());
    }

    #[test]
    fn test_connection_state_serializes_lowercase() {
        let encoded = serde_json::to_string(&LiveConnectionState::Disconnected).unwrap();
        assert_eq!(encoded, "\"disconnected\"");
        assert_eq!(LiveConnectionState::Connecting.to_string(), "connecting");
    }
}
