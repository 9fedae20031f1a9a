use crate::error::TransportError;
use async_trait::async_trait;

/// Represents an abstract duplex transport for the text frames the session
/// protocol runs over.
///
/// Implementations handle the specifics of protocols like WebSockets; the
/// channel manager drives exactly one instance at a time.
#[async_trait]
pub trait Transport: Send + Unpin {
    /// Establishes the connection based on parameters provided during creation.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Closes the connection gracefully.
    async fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Sends a text frame over the established connection.
    async fn send(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Waits for and returns the next text frame from the connection.
    ///
    /// # Returns
    /// * `Some(Ok(String))` - Successfully received a frame.
    /// * `Some(Err(TransportError))` - An error occurred while receiving.
    /// * `None` - The connection was closed from the remote end.
    async fn receive(&mut self) -> Option<Result<String, TransportError>>;
}
