//! The channel lifecycle state machine.
//!
//! All connection/reconnection policy lives here as a pure transition
//! function: the current state plus one event yields the next state and a
//! list of effects (open a transport, start or cancel a timer, notify the
//! session). The `ChannelActor` interprets the effects; this module touches
//! no network and no clocks, so every lifecycle sequence is testable
//! synchronously.

use crate::policy::ReconnectPolicy;
use std::time::Duration;

/// Lifecycle state of the logical channel. Exactly one physical connection
/// (at most) backs the machine at any point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Open,
    Reconnecting,
}

/// Inputs to the machine: channel lifecycle events and timer expirations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Explicit request to (re)connect; supersedes any prior handle.
    ConnectRequested,
    /// The current-generation physical connection finished its handshake.
    TransportOpened,
    /// The current-generation physical connection closed or failed to open.
    TransportClosed,
    /// The pending retry delay elapsed.
    RetryTimerFired,
    /// The pending delay-escalation hold elapsed.
    EscalationTimerFired,
}

/// Session-facing notifications emitted by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    /// The channel is open. `resumed` is true when this open ended a
    /// disconnection episode, in which case stale rendered content must be
    /// discarded before the next payload.
    Opened { resumed: bool },
    /// An unexpected closure started a disconnection episode. Emitted once
    /// per episode, never once per retry.
    EpisodeStarted,
}

/// Side effects requested by a transition, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenTransport,
    CloseTransport,
    StartHeartbeat,
    StopHeartbeat,
    ScheduleRetry(Duration),
    CancelRetry,
    ScheduleEscalation(Duration),
    CancelEscalation,
    Notify(SessionNotice),
}

#[derive(Debug)]
pub struct ChannelMachine {
    state: ChannelState,
    policy: ReconnectPolicy,
    // True from the first unexpected closure until the next successful open.
    in_episode: bool,
}

impl ChannelMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            state: ChannelState::Disconnected,
            policy,
            in_episode: false,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ChannelState::Open
    }

    /// True between the first unexpected closure and the next successful
    /// open; used by the actor to decide how loudly to log a closure.
    pub fn in_episode(&self) -> bool {
        self.in_episode
    }

    /// Applies one event and returns the effects to execute, in order.
    pub fn handle(&mut self, event: ChannelEvent) -> Vec<Effect> {
        match event {
            ChannelEvent::ConnectRequested => self.on_connect_requested(),
            ChannelEvent::TransportOpened => self.on_transport_opened(),
            ChannelEvent::TransportClosed => self.on_transport_closed(),
            ChannelEvent::RetryTimerFired => self.on_retry_timer(),
            ChannelEvent::EscalationTimerFired => self.on_escalation_timer(),
        }
    }

    fn on_connect_requested(&mut self) -> Vec<Effect> {
        let effects = match self.state {
            ChannelState::Disconnected => vec![Effect::OpenTransport],
            // Superseding an in-flight attempt: tear the old handle down
            // first so its late events can't be misrouted.
            ChannelState::Connecting => vec![Effect::CloseTransport, Effect::OpenTransport],
            ChannelState::Open => vec![
                Effect::StopHeartbeat,
                Effect::CloseTransport,
                Effect::OpenTransport,
            ],
            // A pending retry becomes redundant; the episode stays open so a
            // success still reports `resumed: true`.
            ChannelState::Reconnecting => vec![Effect::CancelRetry, Effect::OpenTransport],
        };
        self.state = ChannelState::Connecting;
        effects
    }

    fn on_transport_opened(&mut self) -> Vec<Effect> {
        if self.state != ChannelState::Connecting {
            // Stale signal from a superseded connection
            return vec![];
        }
        let resumed = self.in_episode;
        self.in_episode = false;
        self.policy.reset();
        self.state = ChannelState::Open;
        vec![
            Effect::CancelRetry,
            Effect::CancelEscalation,
            Effect::StartHeartbeat,
            Effect::Notify(SessionNotice::Opened { resumed }),
        ]
    }

    fn on_transport_closed(&mut self) -> Vec<Effect> {
        match self.state {
            ChannelState::Open => {
                let mut effects = vec![Effect::StopHeartbeat];
                effects.extend(self.start_episode());
                effects
            }
            ChannelState::Connecting if self.in_episode => {
                // A retry attempt itself failed: schedule the next attempt
                // with the currently escalated delay. No new notice, no
                // escalation restart.
                self.state = ChannelState::Reconnecting;
                vec![Effect::ScheduleRetry(self.policy.current_delay())]
            }
            ChannelState::Connecting => {
                // The very first connect failed before ever opening; treat it
                // as the start of an episode so backoff engages.
                self.start_episode()
            }
            ChannelState::Reconnecting | ChannelState::Disconnected => vec![],
        }
    }

    fn on_retry_timer(&mut self) -> Vec<Effect> {
        if self.state != ChannelState::Reconnecting {
            return vec![];
        }
        self.state = ChannelState::Connecting;
        vec![Effect::OpenTransport]
    }

    fn on_escalation_timer(&mut self) -> Vec<Effect> {
        // The escalation clock runs on wall time from episode start,
        // independent of individual retry attempts.
        if !self.in_episode {
            return vec![];
        }
        self.policy.escalate();
        match self.policy.next_hold() {
            Some(hold) => vec![Effect::ScheduleEscalation(hold)],
            None => vec![],
        }
    }

    fn start_episode(&mut self) -> Vec<Effect> {
        self.in_episode = true;
        self.policy.reset();
        self.state = ChannelState::Reconnecting;
        let mut effects = vec![Effect::Notify(SessionNotice::EpisodeStarted)];
        if let Some(hold) = self.policy.next_hold() {
            effects.push(Effect::ScheduleEscalation(hold));
        }
        effects.push(Effect::ScheduleRetry(self.policy.current_delay()));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplink_core::config::ReconnectTier;

    fn machine() -> ChannelMachine {
        // The default table: 512 at 0s, 1024 at 10s, 2048 at 60s, 4096 at 300s
        ChannelMachine::new(ReconnectPolicy::new(vec![]))
    }

    fn retry_delay(effects: &[Effect]) -> Option<Duration> {
        effects.iter().find_map(|e| match e {
            Effect::ScheduleRetry(d) => Some(*d),
            _ => None,
        })
    }

    fn notices(effects: &[Effect]) -> Vec<SessionNotice> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Notify(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Drives the machine to `Open` from a fresh start.
    fn open(machine: &mut ChannelMachine) {
        machine.handle(ChannelEvent::ConnectRequested);
        machine.handle(ChannelEvent::TransportOpened);
        assert_eq!(machine.state(), ChannelState::Open);
    }

    #[test]
    fn initial_connect_sequence() {
        let mut m = machine();
        let effects = m.handle(ChannelEvent::ConnectRequested);
        assert_eq!(effects, vec![Effect::OpenTransport]);
        assert_eq!(m.state(), ChannelState::Connecting);

        let effects = m.handle(ChannelEvent::TransportOpened);
        assert_eq!(
            effects,
            vec![
                Effect::CancelRetry,
                Effect::CancelEscalation,
                Effect::StartHeartbeat,
                Effect::Notify(SessionNotice::Opened { resumed: false }),
            ]
        );
        assert!(m.is_open());
    }

    #[test]
    fn heartbeat_runs_iff_open() {
        let mut m = machine();
        let mut heartbeat_active = false;

        let sequence = [
            ChannelEvent::ConnectRequested,
            ChannelEvent::TransportOpened,
            ChannelEvent::TransportClosed,
            ChannelEvent::RetryTimerFired,
            ChannelEvent::TransportClosed,
            ChannelEvent::RetryTimerFired,
            ChannelEvent::TransportOpened,
            ChannelEvent::TransportClosed,
            ChannelEvent::RetryTimerFired,
            ChannelEvent::TransportOpened,
        ];
        for event in sequence {
            for effect in m.handle(event) {
                match effect {
                    Effect::StartHeartbeat => {
                        assert!(!heartbeat_active, "duplicate heartbeat timer");
                        heartbeat_active = true;
                    }
                    Effect::StopHeartbeat => heartbeat_active = false,
                    _ => {}
                }
            }
            assert_eq!(heartbeat_active, m.is_open(), "after {event:?}");
        }
    }

    #[test]
    fn unexpected_close_starts_episode_with_first_tier() {
        let mut m = machine();
        open(&mut m);

        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(
            effects,
            vec![
                Effect::StopHeartbeat,
                Effect::Notify(SessionNotice::EpisodeStarted),
                Effect::ScheduleEscalation(Duration::from_millis(10_000)),
                Effect::ScheduleRetry(Duration::from_millis(512)),
            ]
        );
        assert_eq!(m.state(), ChannelState::Reconnecting);
    }

    #[test]
    fn episode_notice_fires_once_per_episode_not_per_retry() {
        let mut m = machine();
        open(&mut m);

        let mut episode_notices = 0;
        episode_notices += notices(&m.handle(ChannelEvent::TransportClosed))
            .iter()
            .filter(|n| **n == SessionNotice::EpisodeStarted)
            .count();

        // Five failed retries within the same episode
        for _ in 0..5 {
            let effects = m.handle(ChannelEvent::RetryTimerFired);
            assert_eq!(effects, vec![Effect::OpenTransport]);
            let effects = m.handle(ChannelEvent::TransportClosed);
            assert!(notices(&effects).is_empty(), "retry must not re-notify");
        }
        assert_eq!(episode_notices, 1);

        // The eventual success resumes the session...
        m.handle(ChannelEvent::RetryTimerFired);
        let effects = m.handle(ChannelEvent::TransportOpened);
        assert_eq!(
            notices(&effects),
            vec![SessionNotice::Opened { resumed: true }]
        );

        // ...and the next real disconnection starts a fresh episode.
        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(notices(&effects), vec![SessionNotice::EpisodeStarted]);
    }

    #[test]
    fn retry_delays_follow_policy_table_in_order() {
        let mut m = machine();
        open(&mut m);

        // Episode starts on the 512ms tier
        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(512)));

        // 10s of reconnecting time elapse
        let effects = m.handle(ChannelEvent::EscalationTimerFired);
        assert_eq!(
            effects,
            vec![Effect::ScheduleEscalation(Duration::from_millis(50_000))]
        );

        // Failed attempts now use 1024
        m.handle(ChannelEvent::RetryTimerFired);
        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(1_024)));

        // 60s mark
        let effects = m.handle(ChannelEvent::EscalationTimerFired);
        assert_eq!(
            effects,
            vec![Effect::ScheduleEscalation(Duration::from_millis(240_000))]
        );
        m.handle(ChannelEvent::RetryTimerFired);
        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(2_048)));

        // 300s mark: final tier, no further escalation is scheduled
        let effects = m.handle(ChannelEvent::EscalationTimerFired);
        assert_eq!(effects, vec![]);

        // The final delay repeats indefinitely
        for _ in 0..3 {
            m.handle(ChannelEvent::RetryTimerFired);
            let effects = m.handle(ChannelEvent::TransportClosed);
            assert_eq!(retry_delay(&effects), Some(Duration::from_millis(4_096)));
        }
    }

    #[test]
    fn failed_retry_uses_escalated_delay() {
        // The escalation clock runs independently of attempts: a retry that
        // was scheduled on an earlier tier but fails after an escalation
        // reschedules with the newer, longer delay.
        let mut m = machine();
        open(&mut m);

        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(512)));

        // Attempt goes out on the 512 tier...
        m.handle(ChannelEvent::RetryTimerFired);
        // ...the 10s hold expires while it is still in flight...
        m.handle(ChannelEvent::EscalationTimerFired);
        // ...and when the attempt fails, the next one uses the live tier.
        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(1_024)));
    }

    #[test]
    fn success_resets_policy_for_the_next_episode() {
        let mut m = machine();
        open(&mut m);

        m.handle(ChannelEvent::TransportClosed);
        m.handle(ChannelEvent::EscalationTimerFired); // now on 1024
        m.handle(ChannelEvent::RetryTimerFired);
        m.handle(ChannelEvent::TransportOpened); // success resets the policy

        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(512)));
    }

    #[test]
    fn initial_connect_failure_starts_episode() {
        let mut m = machine();
        m.handle(ChannelEvent::ConnectRequested);
        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(notices(&effects), vec![SessionNotice::EpisodeStarted]);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(512)));
        assert_eq!(m.state(), ChannelState::Reconnecting);
    }

    #[test]
    fn explicit_connect_supersedes_pending_retry_but_keeps_episode() {
        let mut m = machine();
        open(&mut m);
        m.handle(ChannelEvent::TransportClosed);

        let effects = m.handle(ChannelEvent::ConnectRequested);
        assert_eq!(effects, vec![Effect::CancelRetry, Effect::OpenTransport]);

        let effects = m.handle(ChannelEvent::TransportOpened);
        assert_eq!(
            notices(&effects),
            vec![SessionNotice::Opened { resumed: true }]
        );
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut m = machine();
        open(&mut m);
        m.handle(ChannelEvent::TransportClosed);

        // Waiting on the retry timer: a late close from the dead connection
        // changes nothing.
        assert_eq!(m.handle(ChannelEvent::TransportClosed), vec![]);
        assert_eq!(m.state(), ChannelState::Reconnecting);

        // Timers of kinds that aren't pending are ignored too.
        let mut fresh = machine();
        assert_eq!(fresh.handle(ChannelEvent::RetryTimerFired), vec![]);
        assert_eq!(fresh.handle(ChannelEvent::EscalationTimerFired), vec![]);
        assert_eq!(fresh.handle(ChannelEvent::TransportOpened), vec![]);
    }

    #[test]
    fn custom_policy_drives_scheduling() {
        let tiers = vec![
            ReconnectTier { hold_ms: 0, delay_ms: 50 },
            ReconnectTier { hold_ms: 500, delay_ms: 75 },
        ];
        let mut m = ChannelMachine::new(ReconnectPolicy::new(tiers));
        open(&mut m);

        let effects = m.handle(ChannelEvent::TransportClosed);
        assert_eq!(retry_delay(&effects), Some(Duration::from_millis(50)));
        assert!(
            effects.contains(&Effect::ScheduleEscalation(Duration::from_millis(500)))
        );
    }
}
