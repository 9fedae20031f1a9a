//! Errors specific to client launch and orchestration.

use thiserror::Error;
use uplink_core::error::CoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration loading failed: {0}")]
    Config(#[from] CoreError),

    #[error("Render container '{0}' not found; a page reload is required")]
    ContainerMissing(String),
}
