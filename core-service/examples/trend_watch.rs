//! Trend watch demonstration
//!
//! Loads the dashboard data once, then follows the live feed until Ctrl+C.
//!
//! Run with:
//! ```bash
//! # Against a local backend on :8000
//! cargo run -p core-service --example trend_watch
//!
//! # Against another backend, with JSON logs
//! TREND_API_BASE_URL=http://trends.internal:8000 \
//! TREND_WS_URL=ws://trends.internal:8000/ws/live \
//! cargo run -p core-service --example trend_watch -- json
//! ```

use bridge_traits::time::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{bootstrap_desktop, LiveMessage};
use std::env;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    let logging = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug);
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return;
    }

    let service = match bootstrap_desktop() {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to start trend service: {}", e);
            return;
        }
    };

    let snapshot = service.load_dashboard(10).await;
    info!(
        degraded = snapshot.is_degraded(),
        api_status = %snapshot.health.api_status,
        "Dashboard loaded"
    );
    for (rank, track) in snapshot.trending.tracks.iter().enumerate() {
        info!(
            "#{:<2} {} - {} ({}, popularity {})",
            rank + 1,
            track.name,
            track.artist_display(),
            track.language,
            track.popularity
        );
    }
    for (language, count) in snapshot.analytics.top_languages(3) {
        info!("{}: {} tracks", language, count);
    }

    service.live().connect_live(
        |message: LiveMessage| info!("Live frame: {}", message.kind.as_str()),
        |state| info!("Live feed is {}", state),
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(20));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                service.live().send_ping();
                let live = service.live().live_analytics();
                info!(
                    tracks = live.total_tracks,
                    avg_popularity = live.avg_popularity,
                    "Live snapshot"
                );
            }
        }
    }

    service.shutdown().await;
}
