//! Factory function for creating Transport implementations from the dialed URL.

use crate::error::TransportError;
use crate::traits::Transport;
use crate::types::WebSocketConnectOptions;

#[cfg(feature = "websocket")]
use crate::websocket::WebSocketTransport;

/// Creates a boxed `Transport` trait object based on the URL scheme.
///
/// Currently supports `ws://` and `wss://` if the `websocket` feature is
/// enabled. Called once per connection attempt, since the dialed URL carries
/// the current route.
pub fn create_transport(
    url: &str,
    options: &WebSocketConnectOptions,
) -> Result<Box<dyn Transport>, TransportError> {
    log::debug!("Attempting to create transport for URL: {}", url);

    if url.starts_with("ws://") || url.starts_with("wss://") {
        #[cfg(feature = "websocket")]
        {
            Ok(Box::new(WebSocketTransport::new(
                url.to_string(),
                options.clone(),
            )))
        }
        #[cfg(not(feature = "websocket"))]
        {
            log::error!("WebSocket URL specified, but 'websocket' feature is not enabled.");
            Err(TransportError::UnsupportedScheme(
                "WebSocket (ws/wss) requires the 'websocket' feature.".to_string(),
            ))
        }
    } else {
        log::error!("Unsupported URL scheme found in: {}", url);
        Err(TransportError::UnsupportedScheme(format!(
            "Scheme not supported or feature not enabled for URL: {}",
            url
        )))
    }
}
