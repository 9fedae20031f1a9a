//! The session controller actor.
//!
//! `SessionActor` layers the application-level protocol on top of the
//! channel: it answers every successful open with the `initialize`
//! handshake, classifies inbound payloads, keeps the server-defined
//! disconnect-action list current, and runs that list once per
//! disconnection episode. The public send surface (`PostMessage`)
//! delegates to the channel and inherits its fire-and-forget semantics.

use crate::actions::run_disconnect_actions;
use crate::collaborators::{EditSink, HostPage, StatusIndicator};
use crate::protocol::{InboundMessage, RawDisconnectAction, decode_message};
use actix::prelude::*;
use log::{debug, info, warn};
use uplink_core::framing::serialize_ipc_message;
use uplink_transport::channel::{ChannelNotice, InboundFrame, SendRaw};
use uplink_transport::machine::SessionNotice;

// --- Actor Messages ---

/// Wires the session to the channel's send surface. Sent once by the launch
/// routine after both actors have started; breaks the construction cycle
/// between them.
#[derive(Message)]
#[rtype(result = "()")]
pub struct AttachChannel(pub Recipient<SendRaw>);

/// An outbound interaction event from the application. Delegated to the
/// channel; callers must not assume delivery.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct PostMessage(pub String);

// --- Actor ---

pub struct SessionActor {
    outbound: Option<Recipient<SendRaw>>,
    renderer: Box<dyn EditSink>,
    indicator: Box<dyn StatusIndicator>,
    host: Box<dyn HostPage>,
    /// Replaced wholesale on every successful (re)connection, executed in
    /// order at the start of each disconnection episode.
    on_disconnect: Vec<RawDisconnectAction>,
}

impl SessionActor {
    pub fn new(
        renderer: Box<dyn EditSink>,
        indicator: Box<dyn StatusIndicator>,
        host: Box<dyn HostPage>,
    ) -> Self {
        Self {
            outbound: None,
            renderer,
            indicator,
            host,
            on_disconnect: Vec::new(),
        }
    }

    fn send_raw(&self, frame: String) {
        match &self.outbound {
            Some(channel) => {
                if channel.try_send(SendRaw(frame)).is_err() {
                    warn!("Channel mailbox unavailable, outbound message dropped.");
                }
            }
            None => debug!("No channel attached yet, outbound message dropped."),
        }
    }
}

impl Actor for SessionActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("SessionActor started.");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("SessionActor stopped.");
    }
}

// --- Message Handlers ---

impl Handler<AttachChannel> for SessionActor {
    type Result = ();

    fn handle(&mut self, msg: AttachChannel, _ctx: &mut Context<Self>) {
        self.outbound = Some(msg.0);
    }
}

impl Handler<ChannelNotice> for SessionActor {
    type Result = ();

    fn handle(&mut self, msg: ChannelNotice, _ctx: &mut Context<Self>) {
        match msg.0 {
            SessionNotice::Opened { resumed } => {
                self.indicator.clear();
                if resumed {
                    // Without this, recovered sessions would render twice:
                    // the stale tree plus the fresh full payload.
                    self.renderer.clear();
                    info!("Channel re-established, requesting fresh session state.");
                }
                self.send_raw(serialize_ipc_message("initialize"));
            }
            SessionNotice::EpisodeStarted => {
                self.indicator.show_disconnected();
                run_disconnect_actions(&self.on_disconnect, self.host.as_mut());
            }
        }
    }
}

impl Handler<InboundFrame> for SessionActor {
    type Result = ();

    fn handle(&mut self, msg: InboundFrame, _ctx: &mut Context<Self>) {
        match decode_message(&msg.0) {
            Ok(InboundMessage::Handshake { edits, on_disconnect }) => {
                debug!(
                    "Handshake-response received ({} disconnect actions).",
                    on_disconnect.len()
                );
                self.on_disconnect = on_disconnect;
                self.renderer.apply_edits(edits);
            }
            Ok(InboundMessage::Edits(payload)) => {
                self.renderer.apply_edits(payload);
            }
            Err(e) => {
                // The connection itself is healthy; drop the frame and log.
                warn!("Dropping inbound frame: {}", e);
            }
        }
    }
}

impl Handler<PostMessage> for SessionActor {
    type Result = ();

    fn handle(&mut self, msg: PostMessage, _ctx: &mut Context<Self>) {
        self.send_raw(msg.0);
    }
}
