//! # Uplink Client Library
//!
//! Entry point for the Uplink remote-UI session client. It ties together
//! the core, transport and session crates: load a [`Config`], implement the
//! collaborator traits for your rendering surface, and [`launch`] a session
//! that keeps itself alive across arbitrarily long outages.
//!
//! ```no_run
//! use uplink_client::{Collaborators, launch, load_config};
//! # fn collaborators() -> Collaborators { unimplemented!() }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let system = actix::System::new();
//! system.block_on(async {
//!     let config = load_config(None)?;
//!     let handle = launch(config, collaborators())?;
//!     handle.post_message(r#"{"method":"user_event","params":{}}"#);
//!     Ok::<_, Box<dyn std::error::Error>>(())
//! })?;
//! system.run()?;
//! # Ok(())
//! # }
//! ```

// Re-export the collaborator seams users must implement
pub use uplink_session::collaborators::{EditSink, HostPage, StatusIndicator};
pub use uplink_transport::types::RouteSource;

// Re-export configuration for advanced setup
pub use uplink_core::config::{Config, ReconnectTier, load_config};
pub use uplink_core::error::HostPageError;

// Re-export value type for edit payloads
pub use serde_json::Value;

// Modules internal to this crate
mod error;
mod launch;

pub use error::ClientError;
pub use launch::{Collaborators, SessionHandle, launch};
