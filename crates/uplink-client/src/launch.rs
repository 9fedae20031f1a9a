//! Session launch and wiring.

use crate::error::ClientError;
use actix::prelude::*;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use uplink_core::config::Config;
use uplink_core::logging;
use uplink_session::collaborators::{EditSink, HostPage, StatusIndicator};
use uplink_session::controller::{AttachChannel, PostMessage, SessionActor};
use uplink_transport::channel::{ChannelActor, ChannelNotice, Connect, InboundFrame, SendRaw};
use uplink_transport::machine::ChannelMachine;
use uplink_transport::policy::ReconnectPolicy;
use uplink_transport::types::{ConnectParams, RouteSource};

/// The collaborator capabilities a session needs from its surroundings,
/// explicitly constructed by the application's startup routine and injected
/// here; the client keeps no ambient globals.
pub struct Collaborators {
    /// Rendering layer that applies update instructions.
    pub renderer: Box<dyn EditSink>,
    /// User-facing "connection lost" indicator.
    pub indicator: Box<dyn StatusIndicator>,
    /// Host page hooks for disconnect actions and the container lookup.
    pub host: Box<dyn HostPage>,
    /// Supplier of the route reported on every connection attempt.
    pub route: Arc<dyn RouteSource>,
}

/// Handle to a running session.
///
/// Dropping the handle does not stop the session; the actors keep the
/// channel alive for the lifetime of the actor system.
pub struct SessionHandle {
    session: Addr<SessionActor>,
    channel: Addr<ChannelActor>,
}

impl SessionHandle {
    /// Sends a raw interaction event to the server. Fire-and-forget: while
    /// the channel is reconnecting the message is dropped, not queued, and
    /// callers must not assume delivery.
    pub fn post_message(&self, raw: impl Into<String>) {
        self.session.do_send(PostMessage(raw.into()));
    }

    /// Requests an immediate (re)connect, superseding any pending retry.
    pub fn reconnect(&self) {
        self.channel.do_send(Connect);
    }

    pub fn session(&self) -> &Addr<SessionActor> {
        &self.session
    }

    pub fn channel(&self) -> &Addr<ChannelActor> {
        &self.channel
    }
}

/// Starts a session: verifies the render container, starts and wires the
/// actors, and issues the initial connect.
///
/// Must be called from within a running actix system. This is the only
/// place a failure is terminal: a missing render container is logged and
/// returned as an error with no retry — everything after this point
/// recovers autonomously.
pub fn launch(config: Config, collaborators: Collaborators) -> Result<SessionHandle, ClientError> {
    if let Err(e) = logging::setup_logging(&config.global.log_level) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    info!("Uplink client starting...");
    debug!("Loaded configuration: {:?}", config);

    let container_id = &config.session.container_id;
    if !collaborators.host.container_exists(container_id) {
        error!("Could not find an element with id '{}'", container_id);
        return Err(ClientError::ContainerMissing(container_id.clone()));
    }

    let session = SessionActor::new(
        collaborators.renderer,
        collaborators.indicator,
        collaborators.host,
    )
    .start();

    let machine = ChannelMachine::new(ReconnectPolicy::from_config(&config.reconnect));
    let channel = ChannelActor::new(
        ConnectParams::from(&config.transport),
        machine,
        Duration::from_millis(config.transport.heartbeat_interval_ms),
        collaborators.route,
        session.clone().recipient::<ChannelNotice>(),
        session.clone().recipient::<InboundFrame>(),
    )
    .start();

    // The session needs the channel's send surface for the handshake and
    // for PostMessage; attach it now that both actors exist.
    session.do_send(AttachChannel(channel.clone().recipient::<SendRaw>()));
    channel.do_send(Connect);

    info!("Uplink client launch sequence complete.");
    Ok(SessionHandle { session, channel })
}
