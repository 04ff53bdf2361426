//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the trend data client and the
//! platform-specific transports it runs on. Each trait represents a capability
//! the core requires but that is implemented differently per platform.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP requests with timeouts and retry
//! - [`LiveConnector`](live::LiveConnector) - Opens persistent push connections
//! - [`LiveConnection`](live::LiveConnection) - Text-frame socket handle
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform-specific errors into it and keep the message
//! actionable (URL, status, what failed).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` (or `Send` for connection handles)
//! so they can be shared across tokio tasks.

pub mod error;
pub mod http;
pub mod live;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
pub use live::{LiveConnection, LiveConnector};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
