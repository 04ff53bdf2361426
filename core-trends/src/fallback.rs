//! Placeholder data served when the trend backend is unavailable.

use crate::models::{AnalyticsSnapshot, Track, TrendingMetadata, TrendingPayload, SOURCE_FALLBACK};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Metadata source of a synthesized trending list.
pub const FALLBACK_TRENDING_SOURCE: &str = "fallback_data";

/// Source tag of synthesized analytics.
pub const FALLBACK_ANALYTICS_SOURCE: &str = "fallback_analytics";

const FALLBACK_NOTE: &str = "Using fallback data due to API unavailability";

const ARTISTS: &[&str] = &[
    "Arijit Singh",
    "Shreya Ghoshal",
    "Rahat Fateh Ali Khan",
    "Armaan Malik",
    "Asees Kaur",
];
const LANGUAGES: &[&str] = &["hindi", "punjabi", "tamil", "telugu"];
const GENRES: &[&str] = &["bollywood", "punjabi", "south_indian", "trending"];

const LANGUAGE_DISTRIBUTION: &[(&str, u64)] = &[
    ("hindi", 60),
    ("punjabi", 25),
    ("tamil", 20),
    ("telugu", 18),
    ("malayalam", 12),
    ("kannada", 8),
    ("bengali", 6),
    ("marathi", 5),
];
const GENRE_DISTRIBUTION: &[(&str, u64)] = &[
    ("bollywood", 55),
    ("punjabi", 25),
    ("south_indian", 30),
    ("trending", 20),
    ("remix", 15),
    ("regional", 10),
];

/// Synthesizes plausible trend data.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Exactly `limit` randomized tracks tagged `fallback`.
    pub fn trending(&self, limit: usize, now: DateTime<Utc>) -> TrendingPayload {
        let mut rng = rand::thread_rng();

        let tracks = (0..limit)
            .map(|i| Track {
                id: format!("fallback_{}", i),
                name: format!("Trending Song {}", i + 1),
                artists: vec![pick(&mut rng, ARTISTS)],
                album: format!("Hit Album {}", i + 1),
                popularity: rng.gen_range(70..=100),
                play_count: rng.gen_range(500_000..=5_000_000),
                duration_ms: Some(rng.gen_range(180_000..=300_000)),
                image_url: Some(format!(
                    "https://via.placeholder.com/500x500/1a1a1a/666666?text=Song+{}",
                    i + 1
                )),
                preview_url: None,
                language: pick(&mut rng, LANGUAGES),
                genre: pick(&mut rng, GENRES),
                is_trending: true,
                source: SOURCE_FALLBACK.to_string(),
            })
            .collect();

        TrendingPayload {
            success: true,
            tracks,
            metadata: TrendingMetadata {
                total_tracks: limit,
                source: FALLBACK_TRENDING_SOURCE.to_string(),
                timestamp: now,
                note: Some(FALLBACK_NOTE.to_string()),
            },
        }
    }

    /// The fixed analytics distribution.
    pub fn analytics(&self, now: DateTime<Utc>) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            by_language: to_map(LANGUAGE_DISTRIBUTION),
            by_genre: to_map(GENRE_DISTRIBUTION),
            total_tracks: 150,
            unique_artists: 75,
            avg_popularity: 82.3,
            source: FALLBACK_ANALYTICS_SOURCE.to_string(),
            timestamp: now,
        }
    }
}

fn pick<R: Rng>(rng: &mut R, choices: &[&str]) -> String {
    choices.choose(rng).copied().unwrap_or_default().to_string()
}

fn to_map(pairs: &[(&str, u64)]) -> BTreeMap<String, u64> {
    pairs
        .iter()
        .map(|(key, count)| (key.to_string(), *count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trending_shape() {
        let payload = FallbackGenerator::new().trending(25, Utc::now());

        assert!(payload.success);
        assert!(payload.is_fallback());
        assert_eq!(payload.tracks.len(), 25);
        assert_eq!(payload.metadata.total_tracks, 25);
        assert!(payload.metadata.note.is_some());

        for (i, track) in payload.tracks.iter().enumerate() {
            assert_eq!(track.id, format!("fallback_{}", i));
            assert_eq!(track.name, format!("Trending Song {}", i + 1));
            assert_eq!(track.album, format!("Hit Album {}", i + 1));
            assert!(track.is_fallback());
            assert!(track.is_trending);
            assert!((70..=100).contains(&track.popularity));
            assert!((500_000..=5_000_000).contains(&track.play_count));
            assert!(matches!(track.duration_ms, Some(180_000..=300_000)));
            assert!(ARTISTS.contains(&track.artists[0].as_str()));
            assert!(LANGUAGES.contains(&track.language.as_str()));
            assert!(GENRES.contains(&track.genre.as_str()));
        }
    }

    #[test]
    fn test_trending_zero_limit() {
        let payload = FallbackGenerator::new().trending(0, Utc::now());
        assert!(payload.tracks.is_empty());
    }

    #[test]
    fn test_analytics_distribution() {
        let analytics = FallbackGenerator::new().analytics(Utc::now());

        assert_eq!(analytics.by_language.len(), 8);
        assert_eq!(analytics.by_language["hindi"], 60);
        assert_eq!(analytics.by_language["marathi"], 5);
        assert_eq!(analytics.by_genre["south_indian"], 30);
        assert_eq!(analytics.total_tracks, 150);
        assert_eq!(analytics.unique_artists, 75);
        assert_eq!(analytics.avg_popularity, 82.3);
        assert_eq!(analytics.source, FALLBACK_ANALYTICS_SOURCE);
        assert_eq!(
            analytics.top_genres(3),
            vec![
                ("bollywood".to_string(), 55),
                ("south_indian".to_string(), 30),
                ("punjabi".to_string(), 25),
            ]
        );
    }
}
