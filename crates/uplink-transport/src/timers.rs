//! Named timer slots for the channel actor.
//!
//! The channel owns at most one heartbeat interval, one retry-delay timer
//! and one delay-escalation timer at any time. `TimerSet` enforces that
//! structurally: setting a slot cancels whatever handle it previously held,
//! so duplicate timers cannot accumulate across reconnect episodes.

use actix::{Actor, AsyncContext, Context, SpawnHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
    Heartbeat,
    RetryDelay,
    DelayEscalation,
}

#[derive(Default)]
pub struct TimerSet {
    heartbeat: Option<SpawnHandle>,
    retry_delay: Option<SpawnHandle>,
    delay_escalation: Option<SpawnHandle>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, slot: TimerSlot) -> &mut Option<SpawnHandle> {
        match slot {
            TimerSlot::Heartbeat => &mut self.heartbeat,
            TimerSlot::RetryDelay => &mut self.retry_delay,
            TimerSlot::DelayEscalation => &mut self.delay_escalation,
        }
    }

    /// Stores `handle` in `slot`, cancelling any previous handle of the same
    /// kind.
    pub fn set<A>(&mut self, slot: TimerSlot, handle: SpawnHandle, ctx: &mut Context<A>)
    where
        A: Actor<Context = Context<A>>,
    {
        if let Some(previous) = self.slot_mut(slot).replace(handle) {
            ctx.cancel_future(previous);
        }
    }

    /// Cancels the timer in `slot` if one is pending; idempotent.
    pub fn cancel_if_present<A>(&mut self, slot: TimerSlot, ctx: &mut Context<A>)
    where
        A: Actor<Context = Context<A>>,
    {
        if let Some(handle) = self.slot_mut(slot).take() {
            ctx.cancel_future(handle);
        }
    }

    /// Drops the stored handle without cancelling; used by a timer callback
    /// to mark its own slot as no longer pending.
    pub fn mark_fired(&mut self, slot: TimerSlot) {
        *self.slot_mut(slot) = None;
    }

    pub fn cancel_all<A>(&mut self, ctx: &mut Context<A>)
    where
        A: Actor<Context = Context<A>>,
    {
        self.cancel_if_present(TimerSlot::Heartbeat, ctx);
        self.cancel_if_present(TimerSlot::RetryDelay, ctx);
        self.cancel_if_present(TimerSlot::DelayEscalation, ctx);
    }

    pub fn is_set(&self, slot: TimerSlot) -> bool {
        match slot {
            TimerSlot::Heartbeat => self.heartbeat.is_some(),
            TimerSlot::RetryDelay => self.retry_delay.is_some(),
            TimerSlot::DelayEscalation => self.delay_escalation.is_some(),
        }
    }
}
