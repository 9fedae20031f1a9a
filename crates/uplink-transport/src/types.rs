use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Supplies the route reported to the server on every connection attempt.
///
/// The value is appended to the endpoint as the `initial_route` query
/// parameter and re-read for each attempt, so a client that navigated while
/// disconnected reconnects against its current location.
pub trait RouteSource: Send + Sync {
    fn current_route(&self) -> String;
}

/// Parameters required to establish the channel's physical connection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectParams {
    /// The session server endpoint (e.g., "ws://127.0.0.1:3030/ws").
    /// The scheme determines the transport type.
    pub endpoint: String,

    /// Connection timeout. Applied during each connection attempt.
    #[serde(with = "serde_duration_ms", default = "default_connect_timeout")]
    pub connection_timeout: Duration,

    /// Options specific to WebSocket connections.
    #[serde(default)]
    pub ws_options: WebSocketConnectOptions,
}

impl ConnectParams {
    /// The URL dialed for one attempt: endpoint plus the current route.
    pub fn connect_url(&self, initial_route: &str) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}initial_route={}", self.endpoint, separator, initial_route)
    }
}

impl From<&uplink_core::config::TransportConfig> for ConnectParams {
    fn from(cfg: &uplink_core::config::TransportConfig) -> Self {
        Self {
            endpoint: cfg.endpoint.clone(),
            connection_timeout: Duration::from_millis(cfg.connect_timeout_ms),
            ws_options: WebSocketConnectOptions {
                max_message_size: cfg.websocket.max_message_size,
                accept_unmasked_frames: cfg.websocket.accept_unmasked_frames,
            },
        }
    }
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Options specific to WebSocket connections.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConnectOptions {
    pub max_message_size: Option<usize>,
    pub accept_unmasked_frames: bool,
}

// Module for serializing/deserializing Duration to/from milliseconds
pub(crate) mod serde_duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
