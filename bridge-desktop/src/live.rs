//! Live Feed Connector using tokio-tungstenite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    live::{LiveConnection, LiveConnector},
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connector for `ws://` and `wss://` endpoints.
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    handshake_timeout: Duration,
}

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self::with_handshake_timeout(Duration::from_secs(10))
    }

    pub fn with_handshake_timeout(handshake_timeout: Duration) -> Self {
        Self { handshake_timeout }
    }
}

impl Default for TungsteniteConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LiveConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn LiveConnection>> {
        debug!(url, "Opening live feed socket");

        let (socket, response) = timeout(self.handshake_timeout, connect_async(url))
            .await
            .map_err(|_| BridgeError::Timeout(format!("WebSocket handshake with {}", url)))?
            .map_err(|e| BridgeError::ConnectionFailed(format!("{}: {}", url, e)))?;

        info!(url, status = response.status().as_u16(), "Live feed socket open");

        Ok(Box::new(TungsteniteConnection {
            socket,
            closed: false,
        }))
    }
}

/// A single open WebSocket.
struct TungsteniteConnection {
    socket: Socket,
    closed: bool,
}

fn is_closed_error(error: &tungstenite::Error) -> bool {
    matches!(
        error,
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed
    )
}

#[async_trait]
impl LiveConnection for TungsteniteConnection {
    async fn recv(&mut self) -> Option<Result<String>> {
        if self.closed {
            return None;
        }

        loop {
            let frame = match self.socket.next().await {
                Some(frame) => frame,
                None => {
                    self.closed = true;
                    return None;
                }
            };

            match frame {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => debug!("Dropping non UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "Peer closed live feed socket");
                    self.closed = true;
                    return None;
                }
                // tungstenite answers pings itself
                Ok(_) => {}
                Err(e) if is_closed_error(&e) => {
                    self.closed = true;
                    return None;
                }
                Err(e) => {
                    self.closed = true;
                    return Some(Err(BridgeError::ConnectionFailed(e.to_string())));
                }
            }
        }
    }

    async fn send(&mut self, text: String) -> Result<()> {
        if self.closed {
            return Err(BridgeError::OperationFailed(
                "Live feed socket is closed".to_string(),
            ));
        }

        self.socket
            .send(Message::Text(text))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("WebSocket send failed: {}", e)))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.socket.close(None).await {
            Ok(()) => Ok(()),
            Err(e) if is_closed_error(&e) => Ok(()),
            Err(e) => Err(BridgeError::OperationFailed(format!(
                "WebSocket close failed: {}",
                e
            ))),
        }
    }
}
