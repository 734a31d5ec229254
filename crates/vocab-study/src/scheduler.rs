//! Deferred execution for feedback auto-advance.
//!
//! Sessions never run callbacks themselves. They ask a [`Scheduler`] to
//! deliver a [`TimerId`] after a delay; whoever owns the session hands that
//! id back through `fire`. A session only honours the id it is currently
//! waiting for, so a late delivery after restart or teardown is a no-op.

use std::time::Duration;

/// Identifies one scheduled auto-advance of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Opaque handle the scheduler uses to cancel a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelHandle(pub u64);

pub trait Scheduler {
    /// Arrange for `timer` to be delivered back to the session after `delay`.
    fn schedule_once(&mut self, delay: Duration, timer: TimerId) -> CancelHandle;

    /// Drop a pending timer. Cancelling an already fired or unknown handle is a no-op.
    fn cancel(&mut self, handle: CancelHandle);
}

/// A scheduler driven by a virtual clock.
///
/// Nothing fires on its own; [`ManualScheduler::elapse`] moves the clock
/// forward and returns the timers that came due, in due order.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_handle: u64,
    pending: Vec<(Duration, CancelHandle, TimerId)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by `by` and drain every timer due at or before the new time.
    pub fn elapse(&mut self, by: Duration) -> Vec<TimerId> {
        self.now += by;
        let now = self.now;
        let mut due: Vec<_> = self
            .pending
            .iter()
            .filter(|(at, _, _)| *at <= now)
            .copied()
            .collect();
        self.pending.retain(|(at, _, _)| *at > now);
        due.sort_by_key(|(at, handle, _)| (*at, handle.0));
        due.into_iter().map(|(_, _, timer)| timer).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Delay until the earliest pending timer, if any.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|(at, _, _)| at.saturating_sub(self.now))
            .min()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&mut self, delay: Duration, timer: TimerId) -> CancelHandle {
        self.next_handle += 1;
        let handle = CancelHandle(self.next_handle);
        self.pending.push((self.now + delay, handle, timer));
        handle
    }

    fn cancel(&mut self, handle: CancelHandle) {
        self.pending.retain(|(_, h, _)| *h != handle);
    }
}
