use crate::error::CoreError;
use serde::Deserialize;
use std::path::PathBuf;

// Re-export for callers that need to match on loading failures
pub use config::ConfigError;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TransportConfig {
    /// WebSocket endpoint of the session server, e.g. "ws://127.0.0.1:3030/ws".
    /// The current page route is appended as a query parameter per attempt.
    pub endpoint: String,
    pub connect_timeout_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub websocket: WebSocketConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://127.0.0.1:3030/ws".to_string(),
            connect_timeout_ms: 10_000, // 10 seconds
            heartbeat_interval_ms: 30_000, // 30 seconds
            websocket: WebSocketConfig::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WebSocketConfig {
    pub max_message_size: Option<usize>,
    pub accept_unmasked_frames: bool,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            max_message_size: Some(64 * 1024 * 1024), // 64 MiB
            accept_unmasked_frames: false,
        }
    }
}

/// One backoff tier: `delay_ms` becomes the active retry delay `hold_ms`
/// milliseconds after a disconnection episode begins.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectTier {
    pub hold_ms: u64,
    pub delay_ms: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Consumed front-to-back once per episode; the last delay repeats
    /// until a successful open resets the sequence.
    pub tiers: Vec<ReconnectTier>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                ReconnectTier { hold_ms: 0, delay_ms: 512 },
                ReconnectTier { hold_ms: 10_000, delay_ms: 1_024 },
                ReconnectTier { hold_ms: 60_000, delay_ms: 2_048 },
                ReconnectTier { hold_ms: 300_000, delay_ms: 4_096 },
            ],
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Element id of the render container looked up once at launch.
    pub container_id: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            container_id: "main".to_string(),
        }
    }
}

// --- Loading Logic ---

pub fn load_config(source_path: Option<PathBuf>) -> Result<Config, CoreError> {
    let default_config_name = "uplink_config"; // Base name for config files

    let mut builder = config::Config::builder()
        // Base defaults come from `impl Default` + `#[serde(default)]`; the
        // explicit seeds keep the most commonly overridden keys visible.
        .set_default("global.log_level", GlobalConfig::default().log_level)
        .map_err(CoreError::Config)?
        .set_default("transport.endpoint", TransportConfig::default().endpoint)
        .map_err(CoreError::Config)?
        .set_default(
            "transport.connect_timeout_ms",
            TransportConfig::default().connect_timeout_ms,
        )
        .map_err(CoreError::Config)?
        .set_default(
            "transport.heartbeat_interval_ms",
            TransportConfig::default().heartbeat_interval_ms,
        )
        .map_err(CoreError::Config)?;

    // Load from specified file path if provided
    if let Some(path) = source_path {
        if path.exists() {
            log::debug!("Loading configuration from: {:?}", path);
            builder = builder.add_source(config::File::from(path).required(true));
        } else {
            log::warn!("Specified configuration file not found: {:?}", path);
        }
    } else {
        // Load from the default location if no specific path is given
        log::debug!(
            "Attempting to load configuration from default locations (e.g., {}.toml)",
            default_config_name
        );
        builder = builder.add_source(config::File::with_name(default_config_name).required(false));
    }

    // Load from environment variables (e.g., UPLINK_GLOBAL_LOG_LEVEL)
    builder = builder.add_source(
        config::Environment::with_prefix("UPLINK")
            .separator("_")
            .try_parsing(true),
    );

    // Build and deserialize
    let cfg = builder
        .build()
        .map_err(CoreError::Config)?
        .try_deserialize::<Config>()
        .map_err(CoreError::Config)?;

    log::debug!("Successfully loaded configuration: {:?}", cfg);
    Ok(cfg)
}
