//! Minimal wiring demo: connects to a session server and logs everything
//! the session does. Point it at a liveview-style endpoint:
//!
//! ```sh
//! cargo run --example terminal_session -- ws://127.0.0.1:3030/ws
//! ```

use log::{LevelFilter, info};
use std::sync::Arc;
use uplink_client::{
    Collaborators, Config, EditSink, HostPage, HostPageError, RouteSource, StatusIndicator, Value,
    launch,
};

/// Renders edit payloads by printing them.
struct LogRenderer;

impl EditSink for LogRenderer {
    fn apply_edits(&mut self, edits: Value) {
        info!("apply_edits: {}", edits);
    }

    fn clear(&mut self) {
        info!("render tree cleared");
    }
}

struct LogIndicator;

impl StatusIndicator for LogIndicator {
    fn show_disconnected(&mut self) {
        info!("*** connection lost ***");
    }

    fn clear(&mut self) {
        info!("*** connected ***");
    }
}

struct DemoHostPage;

impl HostPage for DemoHostPage {
    fn call_function(&mut self, name: &str) -> Result<(), HostPageError> {
        info!("disconnect action: call {name}()");
        Ok(())
    }

    fn set_attribute(&mut self, selector: &str, name: &str, value: &str) -> Result<(), HostPageError> {
        info!("disconnect action: set {selector} {name}={value}");
        Ok(())
    }

    fn container_exists(&self, _id: &str) -> bool {
        true
    }
}

struct RootRoute;

impl RouteSource for RootRoute {
    fn current_route(&self) -> String {
        "/".to_string()
    }
}

#[actix::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Debug)
        .init();

    let mut config = Config::default();
    if let Some(endpoint) = std::env::args().nth(1) {
        config.transport.endpoint = endpoint;
    }

    info!("Connecting to {}", config.transport.endpoint);

    let handle = launch(
        config,
        Collaborators {
            renderer: Box::new(LogRenderer),
            indicator: Box::new(LogIndicator),
            host: Box::new(DemoHostPage),
            route: Arc::new(RootRoute),
        },
    )
    .expect("launch failed");

    // Keep the session alive; the channel reconnects on its own. Kill the
    // server and restart it to watch the backoff and recovery.
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        handle.post_message(r#"{"method":"heartbeat_demo","params":{}}"#);
    }
}
