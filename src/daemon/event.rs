//! Timer events and their delivery to listeners.
//!
//! The engine publishes every lifecycle change as a [`TimerEvent`] through an
//! injected [`EventSink`]. It never knows who is listening. In the daemon the
//! sink is an [`EventBus`] that fans each event out to independent
//! [`TimerListener`]s (audio, notifications, menu bar) and contains their
//! failures.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::notification::NotificationError;
use crate::sound::SoundError;
use crate::types::{TimerPhase, TimerSnapshot, TimerState};

// ============================================================================
// TimerEvent
// ============================================================================

/// Lifecycle events emitted by the timer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// A phase began with its full duration
    PhaseStarted {
        /// Phase that started
        phase: TimerPhase,
    },
    /// A paused phase continued
    Resumed {
        /// Phase that resumed
        phase: TimerPhase,
    },
    /// The running phase was paused
    Paused,
    /// The timer returned to idle through stop or reset
    Stopped,
    /// A phase ran out or was skipped
    PhaseCompleted {
        /// Phase that finished
        phase: TimerPhase,
    },
    /// The countdown crossed a whole second
    Tick {
        /// Whole seconds left, rounded up
        remaining_seconds: u32,
    },
    /// The (state, phase) pair settled on a new value
    StateChanged {
        /// New state
        state: TimerState,
        /// New phase
        phase: TimerPhase,
    },
    /// The configuration was replaced
    ConfigurationChanged,
}

impl TimerEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::PhaseStarted { .. } => "phase_started",
            TimerEvent::Resumed { .. } => "resumed",
            TimerEvent::Paused => "paused",
            TimerEvent::Stopped => "stopped",
            TimerEvent::PhaseCompleted { .. } => "phase_completed",
            TimerEvent::Tick { .. } => "tick",
            TimerEvent::StateChanged { .. } => "state_changed",
            TimerEvent::ConfigurationChanged => "configuration_changed",
        }
    }
}

/// An event together with the engine snapshot taken right after it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerNotice {
    pub event: TimerEvent,
    pub snapshot: TimerSnapshot,
}

// ============================================================================
// EventSink
// ============================================================================

/// Destination for engine events.
pub trait EventSink {
    /// Delivers one event. Must not fail back into the engine.
    fn publish(&mut self, event: &TimerEvent, snapshot: &TimerSnapshot);
}

impl EventSink for mpsc::UnboundedSender<TimerNotice> {
    fn publish(&mut self, event: &TimerEvent, snapshot: &TimerSnapshot) {
        let notice = TimerNotice {
            event: *event,
            snapshot: *snapshot,
        };
        if self.send(notice).is_err() {
            debug!(event = event.name(), "Event receiver dropped");
        }
    }
}

// ============================================================================
// TimerListener
// ============================================================================

/// Errors a listener reports back to the bus.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// Audio playback failed
    #[error(transparent)]
    Sound(#[from] SoundError),

    /// Notification delivery failed
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// The display could not be updated
    #[error("Display update failed: {0}")]
    Display(String),
}

/// A subscriber reacting to engine events.
pub trait TimerListener {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Reacts to one event. Errors are logged by the bus and go no further.
    fn on_event(&mut self, event: &TimerEvent, snapshot: &TimerSnapshot)
        -> Result<(), ListenerError>;
}

// ============================================================================
// EventBus
// ============================================================================

/// Fans events out to every subscribed listener in subscription order.
///
/// A failing listener is logged and skipped; the remaining listeners still
/// receive the event.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn TimerListener>>,
}

impl EventBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    pub fn subscribe(&mut self, listener: Box<dyn TimerListener>) {
        debug!(listener = listener.name(), "Listener subscribed");
        self.listeners.push(listener);
    }

    /// Builder-style [`EventBus::subscribe`].
    pub fn with_listener(mut self, listener: Box<dyn TimerListener>) -> Self {
        self.subscribe(listener);
        self
    }

    /// Names of the subscribed listeners.
    pub fn listener_names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    /// Number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl EventSink for EventBus {
    fn publish(&mut self, event: &TimerEvent, snapshot: &TimerSnapshot) {
        for listener in &mut self.listeners {
            if let Err(e) = listener.on_event(event, snapshot) {
                warn!(
                    listener = listener.name(),
                    event = event.name(),
                    error = %e,
                    "Listener failed"
                );
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::types::TimerConfiguration;

    fn snapshot() -> TimerSnapshot {
        TimerSnapshot {
            state: TimerState::Running,
            phase: TimerPhase::Work,
            time_remaining: Duration::from_secs(1500),
            completed_cycles: 0,
            configuration: TimerConfiguration::default(),
        }
    }

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<(&'static str, TimerEvent)>>>,
        fail: bool,
    }

    impl TimerListener for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn on_event(
            &mut self,
            event: &TimerEvent,
            _snapshot: &TimerSnapshot,
        ) -> Result<(), ListenerError> {
            self.seen.lock().unwrap().push((self.name, *event));
            if self.fail {
                Err(ListenerError::Display("boom".to_string()))
            } else {
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // TimerEvent Tests
    // ------------------------------------------------------------------------

    mod timer_event_tests {
        use super::*;

        #[test]
        fn test_event_names() {
            assert_eq!(
                TimerEvent::PhaseStarted {
                    phase: TimerPhase::Work
                }
                .name(),
                "phase_started"
            );
            assert_eq!(
                TimerEvent::Tick {
                    remaining_seconds: 3
                }
                .name(),
                "tick"
            );
            assert_eq!(TimerEvent::ConfigurationChanged.name(), "configuration_changed");
        }

        #[test]
        fn test_event_is_copy() {
            let event = TimerEvent::PhaseCompleted {
                phase: TimerPhase::LongBreak,
            };
            let copied = event;
            assert_eq!(event, copied);
        }
    }

    // ------------------------------------------------------------------------
    // EventSink Tests
    // ------------------------------------------------------------------------

    mod event_sink_tests {
        use super::*;

        #[test]
        fn test_channel_sink_delivers_notice() {
            let (mut tx, mut rx) = mpsc::unbounded_channel::<TimerNotice>();
            tx.publish(&TimerEvent::Paused, &snapshot());

            let notice = rx.try_recv().unwrap();
            assert_eq!(notice.event, TimerEvent::Paused);
            assert_eq!(notice.snapshot, snapshot());
        }

        #[test]
        fn test_channel_sink_tolerates_dropped_receiver() {
            let (mut tx, rx) = mpsc::unbounded_channel::<TimerNotice>();
            drop(rx);
            tx.publish(&TimerEvent::Stopped, &snapshot());
        }
    }

    // ------------------------------------------------------------------------
    // EventBus Tests
    // ------------------------------------------------------------------------

    mod event_bus_tests {
        use super::*;

        #[test]
        fn test_delivers_to_all_in_order() {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let mut bus = EventBus::new()
                .with_listener(Box::new(Recorder {
                    name: "first",
                    seen: seen.clone(),
                    fail: false,
                }))
                .with_listener(Box::new(Recorder {
                    name: "second",
                    seen: seen.clone(),
                    fail: false,
                }));

            bus.publish(&TimerEvent::Paused, &snapshot());

            assert_eq!(
                *seen.lock().unwrap(),
                vec![("first", TimerEvent::Paused), ("second", TimerEvent::Paused)]
            );
        }

        #[test]
        fn test_failing_listener_does_not_block_others() {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let mut bus = EventBus::new()
                .with_listener(Box::new(Recorder {
                    name: "broken",
                    seen: seen.clone(),
                    fail: true,
                }))
                .with_listener(Box::new(Recorder {
                    name: "healthy",
                    seen: seen.clone(),
                    fail: false,
                }));

            bus.publish(&TimerEvent::Stopped, &snapshot());
            bus.publish(&TimerEvent::Paused, &snapshot());

            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 4);
            assert!(seen.contains(&("healthy", TimerEvent::Stopped)));
            assert!(seen.contains(&("healthy", TimerEvent::Paused)));
        }

        #[test]
        fn test_listener_names() {
            let bus = EventBus::new().with_listener(Box::new(Recorder {
                name: "audio",
                seen: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }));

            assert_eq!(bus.listener_names(), vec!["audio"]);
            assert_eq!(bus.len(), 1);
            assert!(!bus.is_empty());
            assert!(EventBus::new().is_empty());
        }

        #[test]
        fn test_listener_error_display() {
            let err = ListenerError::Display("tray gone".to_string());
            assert_eq!(err.to_string(), "Display update failed: tray gone");
        }
    }
}
