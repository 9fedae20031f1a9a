//! Shared wire-framing helpers.
//!
//! The channel and session layers agree on two reserved text tokens for
//! liveness and on the serialized control-message shape the server expects
//! for the handshake. Everything else on the wire is an opaque JSON payload
//! classified by the session layer.

use serde_json::json;

/// Outbound liveness probe, sent on a fixed interval while the channel is
/// open to keep idle-timeout middleboxes from dropping the connection.
pub const PING_FRAME: &str = "__ping__";

/// Inbound reply to [`PING_FRAME`]; carries no payload and is discarded by
/// the channel layer before classification.
pub const PONG_FRAME: &str = "__pong__";

/// Serializes a parameterless control message.
///
/// `serialize_ipc_message("initialize")` is the handshake request sent
/// immediately after every successful open; the server answers with the
/// initial render state.
pub fn serialize_ipc_message(method: &str) -> String {
    json!({ "method": method, "params": {} }).to_string()
}
