//! # Uplink Session (Session Controller)
//!
//! Application-level protocol on top of the channel manager: the
//! `initialize` handshake after every open, classification of inbound
//! payloads into handshake-responses and steady-state edits, storage and
//! execution of server-defined disconnect actions, and the public send
//! surface used by the rest of the application.
//!
//! Rendering, status display and host-page effects are reached through the
//! collaborator traits in [`collaborators`]; the session never touches a
//! display tree directly.

pub mod actions;
pub mod collaborators;
pub mod controller;
pub mod protocol;

// Re-export key items
pub use actions::run_disconnect_actions;
pub use collaborators::{EditSink, HostPage, StatusIndicator};
pub use controller::{AttachChannel, PostMessage, SessionActor};
pub use protocol::{
    DisconnectAction, InboundMessage, RawDisconnectAction, SetAttributeAction, decode_message,
};
