//! # Uplink Transport (Channel Manager)
//!
//! This crate owns the single physical duplex connection of a session and
//! transparently replaces it on failure. It defines the `Transport` trait
//! for abstracting the underlying protocol (WebSockets today), the pure
//! `ChannelMachine` that encodes the open/close/reconnect lifecycle, the
//! backoff `ReconnectPolicy`, and the `ChannelActor` that drives all of it
//! inside the actor system.
//!
//! The channel layer knows nothing about payload semantics: it filters the
//! reserved liveness pong and hands every other text frame upward for
//! classification.

pub mod channel;
pub mod error;
pub mod factory;
pub mod machine;
pub mod policy;
pub mod timers;
pub mod traits;
pub mod types;
#[cfg(feature = "websocket")]
pub mod websocket;

// Re-export key items
pub use channel::{ChannelActor, ChannelNotice, Connect, InboundFrame, SendRaw};
pub use error::TransportError;
pub use factory::create_transport;
pub use machine::{ChannelEvent, ChannelMachine, ChannelState, Effect, SessionNotice};
pub use policy::ReconnectPolicy;
pub use timers::{TimerSet, TimerSlot};
pub use traits::Transport;
pub use types::{ConnectParams, RouteSource, WebSocketConnectOptions};
