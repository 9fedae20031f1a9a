//! Implementation of the `Transport` trait using WebSockets (`tokio-tungstenite`).

#![cfg(feature = "websocket")] // Only compile this module if websocket feature is enabled

use crate::error::TransportError;
use crate::traits::Transport;
use crate::types::WebSocketConnectOptions;
use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async_with_config,
    tungstenite::{Error as TungsteniteError, protocol::Message as TungsteniteMessage},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, TungsteniteMessage>;
type WsSource = SplitStream<WsStream>;

/// WebSocket transport implementation.
///
/// One instance corresponds to one physical connection attempt; the channel
/// manager creates a fresh instance per attempt and never reuses one.
pub struct WebSocketTransport {
    url: String,
    options: WebSocketConnectOptions,
    sink: Option<WsSink>,
    source: Option<WsSource>,
}

impl WebSocketTransport {
    pub fn new(url: String, options: WebSocketConnectOptions) -> Self {
        Self {
            url,
            options,
            sink: None,
            source: None,
        }
    }

    fn ws_config(
        options: &WebSocketConnectOptions,
    ) -> tokio_tungstenite::tungstenite::protocol::WebSocketConfig {
        let mut config = tokio_tungstenite::tungstenite::protocol::WebSocketConfig::default();
        config.max_message_size = options.max_message_size;
        config.accept_unmasked_frames = options.accept_unmasked_frames;
        config
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.sink.is_some() || self.source.is_some() {
            warn!("WebSocketTransport already connected or partially connected.");
            return Err(TransportError::ConnectionFailed("Already connected".into()));
        }

        info!("Connecting WebSocket to {}", self.url);
        let ws_config = Self::ws_config(&self.options);

        let (ws_stream, response) =
            connect_async_with_config(self.url.as_str(), Some(ws_config), false).await?;

        debug!("WebSocket handshake successful: {:?}", response.status());

        let (sink, source) = ws_stream.split();
        self.sink = Some(sink);
        self.source = Some(source);

        info!("WebSocket connection established.");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        info!("Disconnecting WebSocket.");
        if let Some(mut sink) = self.sink.take() {
            // Attempt to send a Close frame
            match sink.send(TungsteniteMessage::Close(None)).await {
                Ok(_) => debug!("WebSocket Close frame sent."),
                Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed) => {
                    debug!("WebSocket already closed while sending Close frame.")
                }
                Err(e) => {
                    warn!("Error sending WebSocket Close frame: {}. Closing anyway.", e);
                }
            }
            if let Err(e) = sink.close().await {
                // AlreadyClosed is expected if the read side closed first
                if !matches!(
                    e,
                    TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed
                ) {
                    warn!("Error closing WebSocket sink: {}", e);
                }
            }
        }

        // Drop the source stream
        self.source = None;

        info!("WebSocket disconnected.");
        Ok(())
    }

    async fn send(&mut self, frame: &str) -> Result<(), TransportError> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| TransportError::NotConnected("WebSocket sink unavailable".into()))?;

        sink.send(TungsteniteMessage::Text(frame.to_string()))
            .await?;
        Ok(())
    }

    async fn receive(&mut self) -> Option<Result<String, TransportError>> {
        let source = self.source.as_mut()?; // Returns None if source is None

        // Loop past WebSocket control frames; session-level liveness runs on
        // its own text tokens, so Ping/Pong here carry no information.
        loop {
            match source.next().await {
                Some(Ok(msg)) => match msg {
                    TungsteniteMessage::Text(text) => return Some(Ok(text)),
                    TungsteniteMessage::Binary(bin) => {
                        warn!(
                            "Received unexpected WebSocket Binary message ({} bytes), ignoring.",
                            bin.len()
                        );
                        continue;
                    }
                    TungsteniteMessage::Ping(_) | TungsteniteMessage::Pong(_) => {
                        // tungstenite answers Pings on the next write flush
                        continue;
                    }
                    TungsteniteMessage::Close(close_frame) => {
                        info!("Received WebSocket Close frame: {:?}", close_frame);
                        return None; // Signal closure
                    }
                    TungsteniteMessage::Frame(_) => {
                        warn!("Received unexpected WebSocket raw frame, ignoring.");
                        continue;
                    }
                },
                Some(Err(e)) => {
                    return match e {
                        TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed => {
                            info!("WebSocket connection closed while receiving.");
                            None
                        }
                        other => Some(Err(other.into())),
                    };
                }
                None => {
                    info!("WebSocket stream ended (source returned None).");
                    return None; // Stream naturally ended
                }
            }
        }
    }
}
