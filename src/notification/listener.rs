//! Maps timer events to user notifications.

use tracing::debug;

use crate::daemon::event::{ListenerError, TimerEvent, TimerListener};
use crate::types::{TimerPhase, TimerSnapshot};

use super::Notifier;

/// Announces breaks when work completes and work when a break is over.
pub struct NotificationListener<N: Notifier> {
    notifier: N,
    /// Set between a break completing and the next work phase starting.
    break_just_ended: bool,
}

impl<N: Notifier> NotificationListener<N> {
    pub fn new(notifier: N) -> Self {
        Self {
            notifier,
            break_just_ended: false,
        }
    }
}

impl<N: Notifier> TimerListener for NotificationListener<N> {
    fn name(&self) -> &'static str {
        "notifications"
    }

    fn on_event(&mut self, event: &TimerEvent, snapshot: &TimerSnapshot) -> Result<(), ListenerError> {
        match event {
            TimerEvent::PhaseCompleted {
                phase: TimerPhase::Work,
            } => {
                self.break_just_ended = false;
                let upcoming = snapshot.phase_after_current();
                let duration = snapshot.configuration.phase_duration(upcoming);
                debug!(phase = %upcoming, "Announcing break");
                self.notifier
                    .notify_break_start(duration, upcoming == TimerPhase::LongBreak)?;
            }
            TimerEvent::PhaseCompleted { .. } => {
                self.break_just_ended = true;
                self.notifier.notify_break_end()?;
            }
            TimerEvent::PhaseStarted {
                phase: TimerPhase::Work,
            } => {
                if std::mem::take(&mut self.break_just_ended) {
                    self.notifier.notify_work_start()?;
                }
            }
            TimerEvent::Stopped => self.break_just_ended = false,
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::notification::{ids, MockNotifier};
    use crate::types::{TimerConfiguration, TimerState};

    fn completed(phase: TimerPhase, completed_cycles: u32) -> TimerSnapshot {
        TimerSnapshot {
            state: TimerState::Completed,
            phase,
            time_remaining: Duration::ZERO,
            completed_cycles,
            configuration: TimerConfiguration::default(),
        }
    }

    fn listener() -> (NotificationListener<Arc<MockNotifier>>, Arc<MockNotifier>) {
        let notifier = Arc::new(MockNotifier::new());
        (NotificationListener::new(Arc::clone(&notifier)), notifier)
    }

    mod break_start_tests {
        use super::*;

        #[test]
        fn test_work_completion_announces_short_break() {
            let (mut listener, notifier) = listener();
            listener
                .on_event(
                    &TimerEvent::PhaseCompleted {
                        phase: TimerPhase::Work,
                    },
                    &completed(TimerPhase::Work, 1),
                )
                .unwrap();

            let delivered = notifier.delivered();
            assert_eq!(delivered.len(), 1);
            assert_eq!(delivered[0].identifier, ids::BREAK_START);
            assert!(delivered[0].title.contains("Short"));
            assert!(delivered[0].body.contains("5 minute"));
        }

        #[test]
        fn test_fourth_work_completion_announces_long_break() {
            let (mut listener, notifier) = listener();
            listener
                .on_event(
                    &TimerEvent::PhaseCompleted {
                        phase: TimerPhase::Work,
                    },
                    &completed(TimerPhase::Work, 4),
                )
                .unwrap();

            let delivered = notifier.delivered();
            assert!(delivered[0].title.contains("Long"));
            assert!(delivered[0].body.contains("15 minute"));
        }
    }

    mod break_end_tests {
        use super::*;

        #[test]
        fn test_break_end_then_work_start() {
            let (mut listener, notifier) = listener();
            listener
                .on_event(
                    &TimerEvent::PhaseCompleted {
                        phase: TimerPhase::ShortBreak,
                    },
                    &completed(TimerPhase::ShortBreak, 1),
                )
                .unwrap();
            listener
                .on_event(
                    &TimerEvent::PhaseStarted {
                        phase: TimerPhase::Work,
                    },
                    &completed(TimerPhase::Work, 1),
                )
                .unwrap();

            assert_eq!(
                notifier.identifiers(),
                vec![ids::BREAK_END, ids::WORK_START]
            );
        }

        #[test]
        fn test_first_work_start_is_silent() {
            let (mut listener, notifier) = listener();
            listener
                .on_event(
                    &TimerEvent::PhaseStarted {
                        phase: TimerPhase::Work,
                    },
                    &completed(TimerPhase::Work, 0),
                )
                .unwrap();

            assert_eq!(notifier.notification_count(), 0);
        }

        #[test]
        fn test_stop_clears_pending_work_announcement() {
            let (mut listener, notifier) = listener();
            listener
                .on_event(
                    &TimerEvent::PhaseCompleted {
                        phase: TimerPhase::LongBreak,
                    },
                    &completed(TimerPhase::LongBreak, 4),
                )
                .unwrap();
            listener
                .on_event(&TimerEvent::Stopped, &completed(TimerPhase::Work, 0))
                .unwrap();
            listener
                .on_event(
                    &TimerEvent::PhaseStarted {
                        phase: TimerPhase::Work,
                    },
                    &completed(TimerPhase::Work, 0),
                )
                .unwrap();

            assert_eq!(notifier.identifiers(), vec![ids::BREAK_END]);
        }

        #[test]
        fn test_work_start_announced_once() {
            let (mut listener, notifier) = listener();
            let work_started = TimerEvent::PhaseStarted {
                phase: TimerPhase::Work,
            };
            listener
                .on_event(
                    &TimerEvent::PhaseCompleted {
                        phase: TimerPhase::ShortBreak,
                    },
                    &completed(TimerPhase::ShortBreak, 1),
                )
                .unwrap();
            listener
                .on_event(&work_started, &completed(TimerPhase::Work, 1))
                .unwrap();
            listener
                .on_event(&work_started, &completed(TimerPhase::Work, 1))
                .unwrap();

            assert_eq!(notifier.notification_count(), 2);
        }
    }

    #[test]
    fn test_failure_is_reported() {
        let (mut listener, notifier) = listener();
        notifier.set_should_fail(true);

        let result = listener.on_event(
            &TimerEvent::PhaseCompleted {
                phase: TimerPhase::Work,
            },
            &completed(TimerPhase::Work, 1),
        );

        assert!(matches!(result, Err(ListenerError::Notification(_))));
    }
}
