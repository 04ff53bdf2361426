//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `LiveConnector` using `tokio-tungstenite`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TungsteniteConnector};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = Arc::new(ReqwestHttpClient::new()?);
//!     let live_connector = Arc::new(TungsteniteConnector::new());
//!
//!     // Hand both to CoreConfig::builder()
//!     Ok(())
//! }
//! ```

mod http;
mod live;

pub use http::ReqwestHttpClient;
pub use live::TungsteniteConnector;
