//! WebSocket client for the TradeOgre stream
//!
//! Handles connection, control frames, and message reception.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async,
    tungstenite::protocol::Message,
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::error::{RecorderError, Result};
use crate::parser::ControlFrame;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client for a single connection
pub struct WebSocketClient {
    stream: Option<WsStream>,
    endpoint: String,
    connect_timeout: Duration,
}

impl WebSocketClient {
    /// Create a new WebSocket client
    pub fn new(endpoint: &str, connect_timeout: Duration) -> Self {
        Self {
            stream: None,
            endpoint: endpoint.to_string(),
            connect_timeout,
        }
    }

    /// Connect to the WebSocket endpoint within the connect budget
    pub async fn connect(&mut self) -> Result<()> {
        info!(url = %self.endpoint, "Connecting to WebSocket");

        let (ws_stream, response) = timeout(self.connect_timeout, connect_async(&self.endpoint))
            .await
            .map_err(|_| RecorderError::ConnectTimeout(self.connect_timeout.as_millis() as u64))?
            .map_err(|e| RecorderError::Connect(format!("Failed to connect: {}", e)))?;

        info!(status = ?response.status(), "WebSocket connected");
        self.stream = Some(ws_stream);

        Ok(())
    }

    /// Send a control frame as a binary message without awaiting any reply
    pub async fn send_frame(&mut self, frame: &ControlFrame) -> Result<()> {
        let payload = frame.to_bytes()?;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| RecorderError::Connect("Not connected".to_string()))?;

        stream.send(Message::Binary(payload)).await?;
        Ok(())
    }

    /// Receive the next message
    ///
    /// `Ok(None)` means a control message was handled and nothing needs parsing.
    pub async fn recv(&mut self) -> Result<Option<String>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| RecorderError::Connect("Not connected".to_string()))?;

        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                debug!(len = text.len(), "Received text message");
                Ok(Some(text))
            }
            Some(Ok(Message::Binary(data))) => {
                let text = String::from_utf8_lossy(&data).to_string();
                Ok(Some(text))
            }
            Some(Ok(Message::Ping(data))) => {
                debug!("Received ping, sending pong");
                if let Some(stream) = self.stream.as_mut() {
                    let _ = stream.send(Message::Pong(data)).await;
                }
                Ok(None)
            }
            Some(Ok(Message::Pong(_))) => Ok(None),
            Some(Ok(Message::Close(frame))) => {
                warn!(frame = ?frame, "Received close frame");
                self.stream = None;
                Err(RecorderError::StreamClosed("Connection closed".to_string()))
            }
            Some(Ok(Message::Frame(_))) => Ok(None),
            Some(Err(e)) => {
                error!(error = %e, "WebSocket error");
                self.stream = None;
                Err(RecorderError::StreamClosed(e.to_string()))
            }
            None => {
                warn!("WebSocket stream ended");
                self.stream = None;
                Err(RecorderError::StreamClosed("Stream ended".to_string()))
            }
        }
    }

    /// Close the connection
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.close(None).await;
        }
    }
}
