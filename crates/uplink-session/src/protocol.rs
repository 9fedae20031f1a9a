//! Inbound message classification and the disconnect-action wire model.
//!
//! Every non-control frame is a JSON object: either the handshake-response
//! sent after a successful (re)connection, carrying both the initial render
//! state and the disconnect-action list, or a steady-state edits payload.
//! Classification is an explicit decode at this boundary; a frame that
//! fails to decode is the protocol-violation case and is dropped by the
//! caller, since the connection itself is still healthy.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uplink_core::error::ProtocolError;

/// A recognized client-side effect to run when the connection unexpectedly
/// drops, defined by the server at handshake time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DisconnectAction {
    /// Invoke a named function exposed by the host page.
    CallJsFn(String),
    /// Set an attribute on every element matching a selector.
    SetAttribute(SetAttributeAction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAttributeAction {
    pub selector: String,
    pub name: String,
    pub value: String,
}

/// A disconnect-action list element as received. Unrecognized `type` values
/// survive decoding so they can be reported in order at execution time
/// instead of poisoning the whole handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDisconnectAction {
    Recognized(DisconnectAction),
    Unrecognized(Value),
}

/// A classified inbound payload. The control pong never reaches this layer;
/// the channel discards it.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// First data message after a successful open: initial render state plus
    /// the disconnect-action list that replaces any stored one.
    Handshake {
        edits: Value,
        on_disconnect: Vec<RawDisconnectAction>,
    },
    /// Steady-state render instructions, forwarded unchanged.
    Edits(Value),
}

#[derive(Deserialize)]
struct HandshakeMessage {
    edits: Value,
    #[serde(rename = "onDisconnect")]
    on_disconnect: Vec<RawDisconnectAction>,
}

/// Classifies one inbound text frame.
///
/// A frame carrying both `edits` and `onDisconnect` is the
/// handshake-response; any other JSON object is a bare edits payload.
pub fn decode_message(frame: &str) -> Result<InboundMessage, ProtocolError> {
    let value: Value = serde_json::from_str(frame)
        .map_err(|e| ProtocolError::malformed(e.to_string(), frame))?;

    let is_handshake = match value.as_object() {
        Some(object) => object.contains_key("edits") && object.contains_key("onDisconnect"),
        None => return Err(ProtocolError::malformed("expected a JSON object", frame)),
    };

    if is_handshake {
        let handshake: HandshakeMessage = serde_json::from_value(value)
            .map_err(|e| ProtocolError::malformed(e.to_string(), frame))?;
        Ok(InboundMessage::Handshake {
            edits: handshake.edits,
            on_disconnect: handshake.on_disconnect,
        })
    } else {
        Ok(InboundMessage::Edits(value))
    }
}
