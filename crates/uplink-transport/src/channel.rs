//! The channel manager actor.
//!
//! `ChannelActor` owns the single physical connection, its timers and its
//! reconnect policy. All policy decisions are delegated to the pure
//! [`ChannelMachine`](crate::machine::ChannelMachine); this actor only
//! interprets the effects it returns: spawning the connection task, arming
//! and cancelling timers, pushing frames into the outgoing queue and
//! forwarding lifecycle notices to the session.

use crate::error::TransportError;
use crate::factory::create_transport;
use crate::machine::{ChannelEvent, ChannelMachine, Effect, SessionNotice};
use crate::timers::{TimerSet, TimerSlot};
use crate::types::{ConnectParams, RouteSource};
use actix::prelude::*;
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uplink_core::framing::{PING_FRAME, PONG_FRAME};

/// Buffer size of the outgoing frame queue consumed by the write half of
/// the connection task.
const OUTGOING_BUFFER: usize = 64;

// --- Actor Messages ---

/// Request to (re)connect. Safe to send repeatedly; each request supersedes
/// any prior connecting/open handle owned by this actor.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct Connect;

/// A raw outbound text frame. Transmitted only while the channel is open;
/// silently dropped otherwise (session resync happens via the handshake, so
/// transient sends during reconnect are not semantically critical).
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct SendRaw(pub String);

/// A non-control inbound text frame, forwarded verbatim to the session for
/// classification.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct InboundFrame(pub String);

/// Lifecycle notice forwarded to the session controller.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct ChannelNotice(pub SessionNotice);

/// Internal signal from the connection task. Tagged with the generation of
/// the physical connection that produced it so signals from a superseded
/// connection are discarded instead of misrouted into the new state.
#[derive(Message, Debug)]
#[rtype(result = "()")]
struct TransportSignal {
    generation: u64,
    event: TransportSignalKind,
}

#[derive(Debug)]
enum TransportSignalKind {
    Opened,
    Frame(String),
    Closed(Option<TransportError>),
}

// --- Actor ---

pub struct ChannelActor {
    params: ConnectParams,
    route: Arc<dyn RouteSource>,
    heartbeat_interval: Duration,
    machine: ChannelMachine,
    timers: TimerSet,
    /// Generation of the current physical connection; bumped on every open
    /// attempt so late events from a replaced connection are ignored.
    generation: u64,
    outgoing_tx: Option<mpsc::Sender<String>>,
    connection_task: Option<SpawnHandle>,
    session: Recipient<ChannelNotice>,
    frames: Recipient<InboundFrame>,
}

impl ChannelActor {
    pub fn new(
        params: ConnectParams,
        machine: ChannelMachine,
        heartbeat_interval: Duration,
        route: Arc<dyn RouteSource>,
        session: Recipient<ChannelNotice>,
        frames: Recipient<InboundFrame>,
    ) -> Self {
        Self {
            params,
            route,
            heartbeat_interval,
            machine,
            timers: TimerSet::new(),
            generation: 0,
            outgoing_tx: None,
            connection_task: None,
            session,
            frames,
        }
    }

    fn dispatch(&mut self, event: ChannelEvent, ctx: &mut Context<Self>) {
        trace!("Channel event {:?} in state {:?}", event, self.machine.state());
        let effects = self.machine.handle(event);
        for effect in effects {
            self.apply(effect, ctx);
        }
    }

    fn apply(&mut self, effect: Effect, ctx: &mut Context<Self>) {
        match effect {
            Effect::OpenTransport => self.open_transport(ctx),
            Effect::CloseTransport => self.close_transport(ctx),
            Effect::StartHeartbeat => {
                let handle = ctx.run_interval(self.heartbeat_interval, |act, _ctx| {
                    act.send_heartbeat();
                });
                self.timers.set(TimerSlot::Heartbeat, handle, ctx);
            }
            Effect::StopHeartbeat => {
                self.timers.cancel_if_present(TimerSlot::Heartbeat, ctx);
            }
            Effect::ScheduleRetry(delay) => {
                debug!("Scheduling reconnect attempt in {:?}", delay);
                let handle = ctx.run_later(delay, |act, ctx| {
                    act.timers.mark_fired(TimerSlot::RetryDelay);
                    act.dispatch(ChannelEvent::RetryTimerFired, ctx);
                });
                self.timers.set(TimerSlot::RetryDelay, handle, ctx);
            }
            Effect::CancelRetry => {
                self.timers.cancel_if_present(TimerSlot::RetryDelay, ctx);
            }
            Effect::ScheduleEscalation(hold) => {
                debug!("Next backoff tier activates in {:?}", hold);
                let handle = ctx.run_later(hold, |act, ctx| {
                    act.timers.mark_fired(TimerSlot::DelayEscalation);
                    act.dispatch(ChannelEvent::EscalationTimerFired, ctx);
                });
                self.timers.set(TimerSlot::DelayEscalation, handle, ctx);
            }
            Effect::CancelEscalation => {
                self.timers.cancel_if_present(TimerSlot::DelayEscalation, ctx);
            }
            Effect::Notify(notice) => {
                if self.session.try_send(ChannelNotice(notice)).is_err() {
                    warn!("Failed to deliver channel notice to session (mailbox full or gone).");
                }
            }
        }
    }

    fn send_heartbeat(&mut self) {
        if !self.machine.is_open() {
            return;
        }
        if let Some(tx) = &self.outgoing_tx {
            trace!("Sending liveness probe");
            if tx.try_send(PING_FRAME.to_string()).is_err() {
                warn!("Outgoing queue full, skipping liveness probe");
            }
        }
    }

    /// Tears down the current connection task without going through the
    /// machine; used when a new attempt supersedes it.
    fn close_transport(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.connection_task.take() {
            ctx.cancel_future(handle);
        }
        // Dropping the sender ends the write loop of a task that is still
        // draining; its late signals fail the generation check.
        self.outgoing_tx = None;
    }

    fn open_transport(&mut self, ctx: &mut Context<Self>) {
        self.close_transport(ctx);

        self.generation += 1;
        let generation = self.generation;
        // The route is re-evaluated for every attempt
        let url = self.params.connect_url(&self.route.current_route());
        info!("Opening channel to {} (generation {})", url, generation);

        let transport_result = create_transport(&url, &self.params.ws_options);
        let connect_timeout = self.params.connection_timeout;
        let addr = ctx.address();

        let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<String>(OUTGOING_BUFFER);
        self.outgoing_tx = Some(outgoing_tx);

        let connection_fut = async move {
            let mut transport = match transport_result {
                Ok(transport) => transport,
                Err(e) => {
                    error!("Failed to create transport: {}", e);
                    addr.do_send(TransportSignal {
                        generation,
                        event: TransportSignalKind::Closed(Some(e)),
                    });
                    return;
                }
            };

            match tokio::time::timeout(connect_timeout, transport.connect()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    addr.do_send(TransportSignal {
                        generation,
                        event: TransportSignalKind::Closed(Some(e)),
                    });
                    return;
                }
                Err(_elapsed) => {
                    addr.do_send(TransportSignal {
                        generation,
                        event: TransportSignalKind::Closed(Some(TransportError::Timeout)),
                    });
                    return;
                }
            }

            addr.do_send(TransportSignal {
                generation,
                event: TransportSignalKind::Opened,
            });

            // Combined read/write loop. The select result is bound first so
            // the receive future is dropped before the transport is used
            // again; both branches are cancel-safe.
            enum Step {
                Outgoing(Option<String>),
                Incoming(Option<Result<String, TransportError>>),
            }

            let close_reason = loop {
                let step = tokio::select! {
                    frame = outgoing_rx.recv() => Step::Outgoing(frame),
                    received = transport.receive() => Step::Incoming(received),
                };
                match step {
                    Step::Outgoing(Some(frame)) => {
                        if let Err(e) = transport.send(&frame).await {
                            warn!("Transport send error: {}", e);
                            break Some(e);
                        }
                    }
                    Step::Outgoing(None) => {
                        // Superseded from the actor side
                        debug!("Outgoing queue closed, ending connection loop.");
                        break None;
                    }
                    Step::Incoming(Some(Ok(frame))) => {
                        if frame == PONG_FRAME {
                            trace!("Discarding liveness pong");
                            continue;
                        }
                        // Routed through the actor so the generation check
                        // applies to frames as well as lifecycle events.
                        addr.do_send(TransportSignal {
                            generation,
                            event: TransportSignalKind::Frame(frame),
                        });
                    }
                    Step::Incoming(Some(Err(e))) => {
                        break Some(e);
                    }
                    Step::Incoming(None) => {
                        // Closed by the remote end
                        break None;
                    }
                }
            };

            if let Err(e) = transport.disconnect().await {
                debug!("Error during transport disconnect after loop exit: {}", e);
            }
            addr.do_send(TransportSignal {
                generation,
                event: TransportSignalKind::Closed(close_reason),
            });
        };

        self.connection_task = Some(ctx.spawn(connection_fut.into_actor(self)));
    }
}

impl Actor for ChannelActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("ChannelActor started for {}", self.params.endpoint);
    }

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        info!("ChannelActor stopping.");
        self.timers.cancel_all(ctx);
        self.close_transport(ctx);
        Running::Stop
    }
}

// --- Message Handlers ---

impl Handler<Connect> for ChannelActor {
    type Result = ();

    fn handle(&mut self, _msg: Connect, ctx: &mut Context<Self>) {
        self.dispatch(ChannelEvent::ConnectRequested, ctx);
    }
}

impl Handler<SendRaw> for ChannelActor {
    type Result = ();

    fn handle(&mut self, msg: SendRaw, _ctx: &mut Context<Self>) {
        if !self.machine.is_open() {
            debug!(
                "Dropping outbound frame while {:?} (no queueing during reconnect)",
                self.machine.state()
            );
            return;
        }
        if let Some(tx) = &self.outgoing_tx {
            if let Err(e) = tx.try_send(msg.0) {
                warn!("Outgoing frame dropped: {}", e);
            }
        }
    }
}

impl Handler<TransportSignal> for ChannelActor {
    type Result = ();

    fn handle(&mut self, msg: TransportSignal, ctx: &mut Context<Self>) {
        if msg.generation != self.generation {
            trace!(
                "Ignoring signal from superseded connection (generation {} < {})",
                msg.generation, self.generation
            );
            return;
        }
        match msg.event {
            TransportSignalKind::Opened => self.dispatch(ChannelEvent::TransportOpened, ctx),
            TransportSignalKind::Frame(frame) => {
                // Pong filtering happens in the connection task; everything
                // arriving here is session payload.
                if self.frames.try_send(InboundFrame(frame)).is_err() {
                    warn!("Failed to forward inbound frame to session.");
                }
            }
            TransportSignalKind::Closed(reason) => {
                if self.machine.in_episode() {
                    // Reconnect attempts fail noisily enough as it is; keep
                    // quiet until the episode resolves.
                    debug!("Reconnect attempt failed: {:?}", reason);
                } else {
                    match &reason {
                        Some(e) => warn!("Channel closed unexpectedly: {}", e),
                        None => warn!("Channel closed by remote end."),
                    }
                }
                self.dispatch(ChannelEvent::TransportClosed, ctx);
            }
        }
    }
}
