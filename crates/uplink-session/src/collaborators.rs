//! Collaborator capabilities injected into the session controller.
//!
//! The session itself only transports, sequences and recovers; rendering,
//! user-facing status and host-page effects are someone else's job, reached
//! through these seams. Implementations are owned exclusively by the
//! session actor, so methods take `&mut self` and no interior mutability is
//! required.

use serde_json::Value;
use uplink_core::error::HostPageError;

/// The rendering layer that applies update instructions to the display
/// tree. How the instructions are encoded or rendered is opaque here.
pub trait EditSink: Send {
    /// Applies one payload of render instructions.
    fn apply_edits(&mut self, edits: Value);

    /// Discards all rendered content so the next full payload replaces it
    /// cleanly. Called when an open resumes a disconnection episode, to
    /// avoid duplicate or overlaid rendering from stale state. Must be
    /// idempotent: clearing an already-empty sink is a no-op.
    fn clear(&mut self);
}

/// The persistent "connection lost" indicator shown while disconnected.
pub trait StatusIndicator: Send {
    /// Raises the indicator; shown once per episode, not once per retry.
    fn show_disconnected(&mut self);

    /// Removes the indicator; a no-op when none is shown.
    fn clear(&mut self);
}

/// Host-page hooks: the container lookup performed once at startup and the
/// two effects a disconnect action can request.
pub trait HostPage: Send {
    /// Invokes a named function exposed by the host page.
    fn call_function(&mut self, name: &str) -> Result<(), HostPageError>;

    /// Sets an attribute on every element matching `selector`; an empty
    /// match is an error.
    fn set_attribute(&mut self, selector: &str, name: &str, value: &str)
    -> Result<(), HostPageError>;

    /// Whether the render container with the given element id exists.
    /// Checked once at launch; a missing container is fatal.
    fn container_exists(&self, id: &str) -> bool;
}
