//! Live Feed Socket Abstraction
//!
//! A persistent, message-oriented push channel (WebSocket on every current
//! platform). The core only needs text frames in both directions plus a
//! close signal.

use async_trait::async_trait;

use crate::error::Result;

/// An open live-feed connection.
///
/// Implementations deliver text frames in order. Control frames (ping/pong)
/// are handled internally and never surface through [`recv`](Self::recv).
#[async_trait]
pub trait LiveConnection: Send {
    /// Wait for the next text frame.
    ///
    /// Returns `None` once the peer closed the connection or the stream ended.
    /// A transport failure is reported as `Some(Err(_))`; callers should treat
    /// the connection as unusable afterwards.
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Send a text frame to the peer.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Close the connection. Closing an already closed connection is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Factory for live-feed connections.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::live::LiveConnector;
///
/// async fn first_frame(connector: &dyn LiveConnector) -> Option<String> {
///     let mut conn = connector.connect("ws://localhost:8000/ws/live").await.ok()?;
///     conn.recv().await?.ok()
/// }
/// ```
#[async_trait]
pub trait LiveConnector: Send + Sync {
    /// Open a new connection to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ConnectionFailed`](crate::error::BridgeError::ConnectionFailed)
    /// when the handshake fails or the endpoint is unreachable.
    async fn connect(&self, url: &str) -> Result<Box<dyn LiveConnection>>;
}
