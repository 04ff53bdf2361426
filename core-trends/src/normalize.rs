//! Track normalization
//!
//! The backend and the live feed hand out tracks under several naming
//! schemes (`track_name` vs `song`, `artist` vs `primary_artists` vs
//! `artistMap`, ...). Everything is folded into [`Track`] here.

use crate::models::Track;
use serde_json::{Map, Value};

const UNKNOWN_TRACK: &str = "Unknown Track";
const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";
const DEFAULT_LANGUAGE: &str = "hindi";

/// Normalizes every object in `items`. Non-object items are skipped.
pub fn normalize_tracks(items: &[Value], default_source: &str) -> Vec<Track> {
    items
        .iter()
        .filter_map(|item| normalize_track(item, default_source))
        .collect()
}

/// Normalizes one backend track. Returns `None` if `item` is not an object.
pub fn normalize_track(item: &Value, default_source: &str) -> Option<Track> {
    let object = item.as_object()?;

    let id = first_string(object, &["track_id", "id"])
        .unwrap_or_else(|| format!("track_{}", uuid::Uuid::new_v4().simple()));
    let name = first_string(object, &["track_name", "song", "name", "title"])
        .unwrap_or_else(|| UNKNOWN_TRACK.to_string());
    let artists = artists(object);
    let album = album(object).unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

    let play_count = first_number(object, &["play_count", "playCount"])
        .map(|count| count.max(0.0) as u64)
        .unwrap_or(0);
    let popularity = match first_number(object, &["popularity"]) {
        Some(score) => score.clamp(0.0, 100.0).round() as u8,
        None => derive_popularity(play_count, release_year(object)),
    };

    let duration_ms = first_number(object, &["duration_ms"])
        .map(|ms| ms.max(0.0) as u64)
        .or_else(|| {
            first_number(object, &["duration"]).map(|secs| (secs.max(0.0) * 1000.0) as u64)
        });

    let image_url = first_string(object, &["image_url", "image"]).map(|url| upgrade_image(&url));
    let preview_url = first_string(object, &["preview_url", "media_preview_url"]);

    let language = first_string(object, &["language"])
        .map(|language| language.to_lowercase())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let genre = first_string(object, &["genre"])
        .unwrap_or_else(|| derive_genre(&name, &album, &language).to_string());

    let is_trending = object
        .get("is_trending")
        .and_then(Value::as_bool)
        .unwrap_or(popularity > 80);
    let source = first_string(object, &["source"]).unwrap_or_else(|| default_source.to_string());

    Some(Track {
        id,
        name,
        artists,
        album,
        popularity,
        play_count,
        duration_ms,
        image_url,
        preview_url,
        language,
        genre,
        is_trending,
        source,
    })
}

/// Popularity estimate for tracks without a score.
pub fn derive_popularity(play_count: u64, year: Option<i32>) -> u8 {
    let base: u8 = match play_count {
        c if c > 1_000_000 => 90,
        c if c > 500_000 => 80,
        c if c > 100_000 => 70,
        c if c > 50_000 => 60,
        c if c > 10_000 => 50,
        _ => 30,
    };

    let bonus = match year {
        Some(y) if y >= 2025 => 10,
        Some(y) if y >= 2024 => 5,
        _ => 0,
    };

    base.saturating_add(bonus).min(100)
}

/// Genre tag for tracks the backend did not classify.
pub fn derive_genre(title: &str, album: &str, language: &str) -> &'static str {
    let title = title.to_lowercase();
    let album = album.to_lowercase();

    if title.contains("remix") || title.contains("mix") {
        return "remix";
    }
    if title.contains("trending") || album.contains("trending") {
        return "trending";
    }

    match language {
        "hindi" => "bollywood",
        "tamil" | "telugu" | "malayalam" | "kannada" => "south_indian",
        "punjabi" => "punjabi",
        _ => "regional",
    }
}

/// Swaps the 150x150 thumbnail for the 500x500 rendition.
pub fn upgrade_image(url: &str) -> String {
    url.replace("150x150", "500x500")
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_number(object: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
    .filter(|n| n.is_finite())
}

fn artists(object: &Map<String, Value>) -> Vec<String> {
    for key in ["artist", "primary_artists", "artists"] {
        let names = match object.get(key) {
            Some(Value::String(s)) => split_names(s),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Object(o) => o
                        .get("name")
                        .and_then(Value::as_str)
                        .map(|s| s.trim().to_string()),
                    _ => None,
                })
                .filter(|name| !name.is_empty())
                .collect(),
            _ => Vec::new(),
        };
        if !names.is_empty() {
            return names;
        }
    }

    if let Some(Value::Object(map)) = object.get("artistMap") {
        let names: Vec<String> = map
            .keys()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if !names.is_empty() {
            return names;
        }
    }

    vec![UNKNOWN_ARTIST.to_string()]
}

fn split_names(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn album(object: &Map<String, Value>) -> Option<String> {
    match object.get("album")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Object(o) => o
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn release_year(object: &Map<String, Value>) -> Option<i32> {
    ["year", "release_date"].iter().find_map(|key| {
        let raw = match object.get(*key)? {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            _ => return None,
        };
        raw.get(..4)?.parse().ok()
    })
}
