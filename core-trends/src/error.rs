use thiserror::Error;

/// Failure classes of a trend backend call.
///
/// These never reach callers of the public fetch operations; they decide
/// which fallback is served and what gets logged.
#[derive(Error, Debug)]
pub enum TrendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, TrendError>;
