//! Timer engine for the Pomodoro timer.
//!
//! This module provides the core state machine:
//! - State transitions (Idle → Running ⇄ Paused, Completed → Running)
//! - Countdown driven by a 100ms tick from an injected [`Scheduler`]
//! - Long break after every N completed work phases
//! - Deferred auto-start of the next phase
//! - Event publishing through an injected [`EventSink`]
//!
//! Engine operations never fail. A call that does not fit the current state
//! is a no-op and returns `false`.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::settings::ConfigStore;
use crate::types::{TimerConfiguration, TimerPhase, TimerSnapshot, TimerState};

use super::event::{EventSink, TimerEvent};
use super::scheduler::{ManualScheduler, Scheduler, Wakeup};

// ============================================================================
// Constants
// ============================================================================

/// Countdown granularity.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Delay between a phase completing and its successor auto-starting.
pub const AUTO_START_DELAY: Duration = Duration::from_secs(1);

/// Remaining time rounded up to whole seconds.
fn ceil_seconds(remaining: Duration) -> u32 {
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Pomodoro state machine.
///
/// Owns the state, phase, remaining time and cycle count exclusively. Every
/// mutation is complete before the matching event is published, so listeners
/// reading the snapshot always see post-transition values.
pub struct TimerEngine<S: Scheduler> {
    state: TimerState,
    phase: TimerPhase,
    time_remaining: Duration,
    /// Taken on pause, consumed on resume
    paused_time_remaining: Option<Duration>,
    completed_cycles: u32,
    configuration: TimerConfiguration,
    scheduler: S,
    store: Box<dyn ConfigStore>,
    sink: Box<dyn EventSink>,
    /// Last (state, phase) pair published as `StateChanged`
    announced: (TimerState, TimerPhase),
}

impl<S: Scheduler> TimerEngine<S> {
    /// Creates an idle engine at the start of a work phase.
    ///
    /// The configuration is loaded from `store`.
    pub fn new(scheduler: S, store: Box<dyn ConfigStore>, sink: Box<dyn EventSink>) -> Self {
        let configuration = store.load();
        debug!(?configuration, "Timer engine created");

        Self {
            state: TimerState::Idle,
            phase: TimerPhase::Work,
            time_remaining: configuration.phase_duration(TimerPhase::Work),
            paused_time_remaining: None,
            completed_cycles: 0,
            configuration,
            scheduler,
            store,
            sink,
            announced: (TimerState::Idle, TimerPhase::Work),
        }
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Starts the current phase, or resumes it if paused.
    ///
    /// No-op while running.
    pub fn start(&mut self) -> bool {
        let applied = match self.state {
            TimerState::Running => false,
            TimerState::Paused => {
                self.scheduler.cancel(Wakeup::AutoStart);
                if let Some(snapshot) = self.paused_time_remaining.take() {
                    self.time_remaining = snapshot.min(self.phase_duration());
                }
                self.state = TimerState::Running;
                self.scheduler.schedule_repeating(Wakeup::Tick, TICK_INTERVAL);
                debug!(phase = %self.phase, remaining = ?self.time_remaining, "Timer resumed");
                self.emit(TimerEvent::Resumed { phase: self.phase });
                true
            }
            TimerState::Idle | TimerState::Completed => {
                self.scheduler.cancel(Wakeup::AutoStart);
                self.paused_time_remaining = None;
                self.time_remaining = self.phase_duration();
                self.state = TimerState::Running;
                self.scheduler.schedule_repeating(Wakeup::Tick, TICK_INTERVAL);
                debug!(phase = %self.phase, "Phase started");
                self.emit(TimerEvent::PhaseStarted { phase: self.phase });
                true
            }
        };

        self.announce_state();
        applied
    }

    /// Pauses the running phase, keeping its remaining time.
    pub fn pause(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }

        self.scheduler.cancel(Wakeup::Tick);
        self.paused_time_remaining = Some(self.time_remaining);
        self.state = TimerState::Paused;
        debug!(phase = %self.phase, remaining = ?self.time_remaining, "Timer paused");
        self.emit(TimerEvent::Paused);

        self.announce_state();
        true
    }

    /// Returns to idle and rewinds the current phase to its full duration.
    ///
    /// Also cancels a pending auto-start. No-op while idle.
    pub fn stop(&mut self) -> bool {
        if self.state == TimerState::Idle {
            return false;
        }

        self.scheduler.cancel(Wakeup::Tick);
        self.scheduler.cancel(Wakeup::AutoStart);
        self.paused_time_remaining = None;
        self.state = TimerState::Idle;
        self.time_remaining = self.phase_duration();
        debug!(phase = %self.phase, "Timer stopped");
        self.emit(TimerEvent::Stopped);

        self.announce_state();
        true
    }

    /// Completes the current phase immediately, as if its time ran out.
    ///
    /// Only while running or paused.
    pub fn skip(&mut self) -> bool {
        if !matches!(self.state, TimerState::Running | TimerState::Paused) {
            return false;
        }

        self.scheduler.cancel(Wakeup::Tick);
        debug!(phase = %self.phase, remaining = ?self.time_remaining, "Phase skipped");
        self.complete_phase();

        self.announce_state();
        true
    }

    /// Returns to an idle work phase and clears the cycle count.
    ///
    /// Applies in every state.
    pub fn reset(&mut self) -> bool {
        self.scheduler.cancel(Wakeup::Tick);
        self.scheduler.cancel(Wakeup::AutoStart);
        self.paused_time_remaining = None;
        self.state = TimerState::Idle;
        self.phase = TimerPhase::Work;
        self.completed_cycles = 0;
        self.time_remaining = self.phase_duration();
        debug!("Timer reset");
        self.emit(TimerEvent::Stopped);

        self.announce_state();
        true
    }

    /// Pauses while running, starts or resumes otherwise.
    pub fn toggle_timer(&mut self) -> bool {
        match self.state {
            TimerState::Running => self.pause(),
            TimerState::Idle | TimerState::Paused | TimerState::Completed => self.start(),
        }
    }

    /// Leaves a break for a fresh work phase and starts it.
    ///
    /// The cycle count is kept. In a work phase this is [`start`](Self::start).
    pub fn start_work(&mut self) -> bool {
        if self.phase == TimerPhase::Work {
            return self.start();
        }

        self.scheduler.cancel(Wakeup::Tick);
        self.scheduler.cancel(Wakeup::AutoStart);
        self.paused_time_remaining = None;
        debug!(left = %self.phase, "Break left for work");
        self.state = TimerState::Idle;
        self.phase = TimerPhase::Work;
        self.start()
    }

    /// Replaces the configuration and persists it.
    ///
    /// An invalid configuration is replaced by the defaults. The remaining
    /// time (and the pause snapshot) is re-based to the full duration of the
    /// current phase; phase and cycle count are kept.
    pub fn set_configuration(&mut self, configuration: TimerConfiguration) {
        let configuration = match configuration.validate() {
            Ok(()) => configuration,
            Err(e) => {
                warn!(error = %e, "Invalid configuration, falling back to defaults");
                TimerConfiguration::default()
            }
        };

        self.configuration = configuration;
        self.store.save(&configuration);

        self.time_remaining = self.phase_duration();
        if self.state == TimerState::Paused {
            self.paused_time_remaining = Some(self.time_remaining);
        }
        info!(?configuration, "Configuration updated");
        self.emit(TimerEvent::ConfigurationChanged);

        self.announce_state();
    }

    /// Runs the work behind a fired wakeup.
    ///
    /// Stale wakeups (a tick while not running, an auto-start after the user
    /// already acted) are ignored.
    pub fn handle_wakeup(&mut self, wakeup: Wakeup) {
        match wakeup {
            Wakeup::Tick => self.on_tick(),
            Wakeup::AutoStart => self.on_auto_start(),
        }
        self.announce_state();
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current run state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Current phase.
    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    /// Remaining time in the current phase.
    pub fn time_remaining(&self) -> Duration {
        self.time_remaining
    }

    /// Work phases completed since the last reset.
    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    /// Active configuration.
    pub fn configuration(&self) -> &TimerConfiguration {
        &self.configuration
    }

    /// Remaining time as `MM:SS`, floored to whole seconds.
    pub fn formatted_time_remaining(&self) -> String {
        self.snapshot().formatted_time_remaining()
    }

    /// Elapsed fraction of the current phase, from 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        self.snapshot().progress()
    }

    /// Countdown text for the menu bar, if it should be shown.
    pub fn menu_bar_time(&self) -> Option<String> {
        self.snapshot().menu_bar_time()
    }

    /// Read-only view of the engine.
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            phase: self.phase,
            time_remaining: self.time_remaining,
            completed_cycles: self.completed_cycles,
            configuration: self.configuration,
        }
    }

    /// The scheduler driving this engine.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Mutable access to the scheduler, for the event loop to await wakeups.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn phase_duration(&self) -> Duration {
        self.configuration.phase_duration(self.phase)
    }

    fn on_tick(&mut self) {
        if self.state != TimerState::Running {
            return;
        }

        let before = ceil_seconds(self.time_remaining);
        self.time_remaining = self.time_remaining.saturating_sub(TICK_INTERVAL);
        let after = ceil_seconds(self.time_remaining);

        for remaining_seconds in (after..before).rev() {
            self.emit(TimerEvent::Tick { remaining_seconds });
        }

        if self.time_remaining.is_zero() {
            self.complete_phase();
        }
    }

    fn on_auto_start(&mut self) {
        if self.state != TimerState::Completed {
            debug!(state = %self.state, "Ignoring stale auto-start");
            return;
        }
        self.start();
    }

    /// Shared by natural expiry and skip. The tick must already be cancelled.
    fn complete_phase(&mut self) {
        self.scheduler.cancel(Wakeup::Tick);
        self.paused_time_remaining = None;

        let finished = self.phase;
        self.state = TimerState::Completed;
        self.time_remaining = Duration::ZERO;
        if finished == TimerPhase::Work {
            self.completed_cycles += 1;
        }
        info!(
            phase = %finished,
            completed_cycles = self.completed_cycles,
            "Phase completed"
        );
        self.emit(TimerEvent::PhaseCompleted { phase: finished });

        self.phase = finished.following(
            self.completed_cycles,
            self.configuration.cycles_before_long_break,
        );
        self.time_remaining = self.phase_duration();

        let auto_start = match finished {
            TimerPhase::Work => self.configuration.auto_start_breaks,
            TimerPhase::ShortBreak | TimerPhase::LongBreak => self.configuration.auto_start_work,
        };
        if auto_start {
            debug!(next = %self.phase, "Auto-start scheduled");
            self.scheduler.schedule_once(Wakeup::AutoStart, AUTO_START_DELAY);
        } else {
            self.state = TimerState::Idle;
        }
    }

    fn announce_state(&mut self) {
        let current = (self.state, self.phase);
        if current != self.announced {
            self.announced = current;
            self.emit(TimerEvent::StateChanged {
                state: self.state,
                phase: self.phase,
            });
        }
    }

    fn emit(&mut self, event: TimerEvent) {
        let snapshot = self.snapshot();
        self.sink.publish(&event, &snapshot);
    }
}

impl TimerEngine<ManualScheduler> {
    /// Moves virtual time forward by `by`, firing every wakeup due on the way.
    ///
    /// Wakeups armed while advancing (such as the auto-start armed by a
    /// completing tick) fire too if they fall inside the window.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        while let Some(wakeup) = self.scheduler.pop_due(until) {
            self.handle_wakeup(wakeup);
        }
        self.scheduler.advance_to(until);
    }
}

// ============================================================================
// Tests
// ============================================================================
