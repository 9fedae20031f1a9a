use thiserror::Error;

// Re-export for convenience elsewhere
pub use actix::MailboxError;
pub use config::ConfigError;

/// Errors raised while classifying inbound frames at the session boundary.
///
/// A malformed frame never tears the connection down; the session layer
/// drops the frame and logs it.
#[derive(Error, Debug, Clone)]
pub enum ProtocolError {
    #[error("Malformed inbound frame: {reason} - frame fragment: '{fragment}'")]
    MalformedFrame {
        reason: String,
        // Leading slice of the offending frame, for the log line
        fragment: String,
    },

    #[error("Internal protocol handling error: {0}")]
    Internal(String),
}

/// Failures reported by the host page while executing a disconnect action.
///
/// Each failure is logged and the remaining actions still run; these never
/// affect connection state.
#[derive(Error, Debug, Clone)]
pub enum HostPageError {
    #[error("'{0}' is not a callable function on the host page")]
    MissingFunction(String),

    #[error("selector '{0}' does not match any element")]
    NoSuchElement(String),

    #[error("host page error: {0}")]
    Other(String),
}

/// Top-level internal errors surfaced during startup.
///
/// Everything recoverable (transport failures, malformed frames, action
/// failures) is absorbed below this level and never reaches `CoreError`.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    LoggingSetup(String),

    #[error("Actor mailbox error: {0}")]
    ActorMailbox(#[from] MailboxError),

    #[error("Internal client error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// Builds a `MalformedFrame` error, truncating the frame so log lines
    /// stay bounded no matter what the server sent.
    pub fn malformed(reason: impl Into<String>, frame: &str) -> Self {
        const FRAGMENT_LEN: usize = 120;
        ProtocolError::MalformedFrame {
            reason: reason.into(),
            fragment: frame.chars().take(FRAGMENT_LEN).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_frame_truncates_fragment() {
        let long = "x".repeat(500);
        let err = ProtocolError::malformed("not json", &long);
        match err {
            ProtocolError::MalformedFrame { fragment, .. } => {
                assert_eq!(fragment.chars().count(), 120);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
