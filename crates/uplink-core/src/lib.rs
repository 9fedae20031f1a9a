//! # Uplink Core
//!
//! Shared foundation for the Uplink client: the error taxonomy, the
//! configuration layer, the wire-framing helpers common to the transport
//! and session layers, and an optional logging bootstrap.
//!
//! Nothing in this crate talks to the network; the transport and session
//! crates build on top of it.

pub mod config;
pub mod error;
pub mod framing;
pub mod logging;

// Re-export key items
pub use config::{
    Config, GlobalConfig, ReconnectConfig, ReconnectTier, SessionConfig, TransportConfig,
    WebSocketConfig, load_config,
};
pub use error::{CoreError, HostPageError, ProtocolError};
pub use framing::{PING_FRAME, PONG_FRAME, serialize_ipc_message};
