//! Wakeup scheduling for the timer engine.
//!
//! The engine never sleeps or spawns by itself. It arms named wakeups on a
//! [`Scheduler`] and is called back with [`TimerEngine::handle_wakeup`] when
//! one fires. Two schedulers are provided:
//! - [`TokioScheduler`]: real time, polled from the daemon's event loop
//! - [`ManualScheduler`]: virtual time, advanced explicitly by tests
//!
//! Arming a wakeup that is already armed replaces it, so at most one source
//! per wakeup is ever active.
//!
//! [`TimerEngine::handle_wakeup`]: super::timer::TimerEngine::handle_wakeup

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};

// ============================================================================
// Wakeup
// ============================================================================

/// Reasons the engine asks to be woken up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wakeup {
    /// Periodic countdown tick
    Tick,
    /// Deferred automatic start of the next phase
    AutoStart,
}

impl Wakeup {
    /// All wakeups, in polling priority order.
    pub const ALL: [Wakeup; 2] = [Wakeup::Tick, Wakeup::AutoStart];

    fn index(self) -> usize {
        match self {
            Wakeup::Tick => 0,
            Wakeup::AutoStart => 1,
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Arms and cancels engine wakeups.
pub trait Scheduler {
    /// Fires `wakeup` every `period`, first one `period` from now.
    fn schedule_repeating(&mut self, wakeup: Wakeup, period: Duration);

    /// Fires `wakeup` once, `delay` from now.
    fn schedule_once(&mut self, wakeup: Wakeup, delay: Duration);

    /// Disarms `wakeup`. Cancelling an unarmed wakeup is a no-op.
    fn cancel(&mut self, wakeup: Wakeup);

    /// Returns true if `wakeup` is armed.
    fn is_scheduled(&self, wakeup: Wakeup) -> bool;
}

// ============================================================================
// TokioScheduler
// ============================================================================

enum Slot {
    Repeating(Interval),
    Once(Pin<Box<Sleep>>),
}

/// Scheduler backed by tokio timers.
///
/// Owned by the daemon loop, which awaits [`TokioScheduler::next_wakeup`]
/// alongside its other event sources.
#[derive(Default)]
pub struct TokioScheduler {
    slots: [Option<Slot>; 2],
}

impl TokioScheduler {
    /// Creates a scheduler with nothing armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the next armed wakeup to fire.
    ///
    /// Pending forever while nothing is armed. Cancel-safe: dropping the
    /// future loses no wakeup.
    pub async fn next_wakeup(&mut self) -> Wakeup {
        std::future::poll_fn(|cx| self.poll_wakeup(cx)).await
    }

    fn poll_wakeup(&mut self, cx: &mut Context<'_>) -> Poll<Wakeup> {
        for wakeup in Wakeup::ALL {
            let slot = &mut self.slots[wakeup.index()];
            let fired = match slot {
                Some(Slot::Repeating(interval)) => interval.poll_tick(cx).is_ready(),
                Some(Slot::Once(delay)) => delay.as_mut().poll(cx).is_ready(),
                None => false,
            };

            if fired {
                if matches!(slot, Some(Slot::Once(_))) {
                    *slot = None;
                }
                return Poll::Ready(wakeup);
            }
        }
        Poll::Pending
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_repeating(&mut self, wakeup: Wakeup, period: Duration) {
        let mut interval = interval_at(Instant::now() + period, period);
        // Missed ticks are replayed to keep the countdown on wall-clock time.
        interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
        self.slots[wakeup.index()] = Some(Slot::Repeating(interval));
    }

    fn schedule_once(&mut self, wakeup: Wakeup, delay: Duration) {
        self.slots[wakeup.index()] = Some(Slot::Once(Box::pin(sleep(delay))));
    }

    fn cancel(&mut self, wakeup: Wakeup) {
        self.slots[wakeup.index()] = None;
    }

    fn is_scheduled(&self, wakeup: Wakeup) -> bool {
        self.slots[wakeup.index()].is_some()
    }
}

// ============================================================================
// ManualScheduler
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Entry {
    wakeup: Wakeup,
    due: Duration,
    period: Option<Duration>,
    seq: u64,
}

/// Scheduler driven by a virtual clock.
///
/// Time only moves when [`ManualScheduler::pop_due`] or
/// [`ManualScheduler::advance_to`] is called, which makes engine scenarios
/// reproducible to the millisecond.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    entries: Vec<Entry>,
    next_seq: u64,
}

impl ManualScheduler {
    /// Creates a scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed wakeups.
    pub fn armed_count(&self) -> usize {
        self.entries.len()
    }

    /// Due time of the earliest armed wakeup.
    pub fn next_due(&self) -> Option<Duration> {
        self.earliest().map(|(_, entry)| entry.due)
    }

    /// Fires the earliest wakeup due at or before `until`.
    ///
    /// Moves the clock to the wakeup's due time. Repeating wakeups are
    /// re-armed one period later; one-shot wakeups are removed.
    pub fn pop_due(&mut self, until: Duration) -> Option<Wakeup> {
        let (index, entry) = self.earliest()?;
        if entry.due > until {
            return None;
        }

        self.now = self.now.max(entry.due);
        match entry.period {
            Some(period) => {
                let seq = self.bump_seq();
                let rearmed = &mut self.entries[index];
                rearmed.due += period;
                rearmed.seq = seq;
            }
            None => {
                self.entries.remove(index);
            }
        }
        Some(entry.wakeup)
    }

    /// Moves the clock forward to `until` without firing anything.
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn earliest(&self) -> Option<(usize, Entry)> {
        self.entries
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn arm(&mut self, wakeup: Wakeup, delay: Duration, period: Option<Duration>) {
        self.cancel(wakeup);
        let seq = self.bump_seq();
        self.entries.push(Entry {
            wakeup,
            due: self.now + delay,
            period,
            seq,
        });
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, wakeup: Wakeup, period: Duration) {
        self.arm(wakeup, period, Some(period));
    }

    fn schedule_once(&mut self, wakeup: Wakeup, delay: Duration) {
        self.arm(wakeup, delay, None);
    }

    fn cancel(&mut self, wakeup: Wakeup) {
        self.entries.retain(|entry| entry.wakeup != wakeup);
    }

    fn is_scheduled(&self, wakeup: Wakeup) -> bool {
        self.entries.iter().any(|entry| entry.wakeup == wakeup)
    }
}

// ============================================================================
// Tests
// ============================================================================
