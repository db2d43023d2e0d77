//! Notification collaborator.
//!
//! The timer's notification listener talks to a [`Notifier`]:
//!
//! - `SystemNotifier` posts through `UNUserNotificationCenter` (macOS only)
//! - [`LogNotifier`] writes notifications to the log
//! - [`MockNotifier`] records notifications for tests
//!
//! Delivery is fire-and-forget. When permission was not granted the system
//! notifier skips silently instead of failing.
//!
//! Break notifications carry action buttons. On macOS `NotificationActions`
//! registers them and forwards every click as a [`NotificationResponse`].
//!
//! # Requirements
//!
//! - macOS 10.14+
//! - The binary must be code-signed for notifications to work properly
//!
//! ```bash
//! codesign --force --deep --sign - target/release/pomobar
//! ```

mod actions;
#[cfg(target_os = "macos")]
mod center;
mod content;
#[cfg(target_os = "macos")]
mod delegate;
mod error;
mod listener;
#[cfg(target_os = "macos")]
mod request;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

pub use self::actions::{action_ids, category_ids, NotificationAction, NotificationResponse};
pub use self::content::{
    break_end_content, break_start_content, ids, whole_minutes, work_start_content,
    NotificationContent,
};
pub use self::error::NotificationError;
pub use self::listener::NotificationListener;

/// Notification capability consumed by the notification listener.
pub trait Notifier {
    /// Delivers one notification.
    fn deliver(&self, content: NotificationContent) -> Result<(), NotificationError>;

    /// Announces a break of the given length.
    fn notify_break_start(
        &self,
        duration: Duration,
        is_long_break: bool,
    ) -> Result<(), NotificationError> {
        self.deliver(break_start_content(duration, is_long_break))
    }

    /// Announces the end of a break.
    fn notify_break_end(&self) -> Result<(), NotificationError> {
        self.deliver(break_end_content())
    }

    /// Announces the start of a work session.
    fn notify_work_start(&self) -> Result<(), NotificationError> {
        self.deliver(work_start_content())
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn deliver(&self, content: NotificationContent) -> Result<(), NotificationError> {
        (**self).deliver(content)
    }

    fn notify_break_start(
        &self,
        duration: Duration,
        is_long_break: bool,
    ) -> Result<(), NotificationError> {
        (**self).notify_break_start(duration, is_long_break)
    }

    fn notify_break_end(&self) -> Result<(), NotificationError> {
        (**self).notify_break_end()
    }

    fn notify_work_start(&self) -> Result<(), NotificationError> {
        (**self).notify_work_start()
    }
}

/// Notifier that writes every notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, content: NotificationContent) -> Result<(), NotificationError> {
        info!(
            identifier = %content.identifier,
            title = %content.title,
            "{}",
            content.body
        );
        Ok(())
    }
}

#[cfg(target_os = "macos")]
pub use self::system::{NotificationActions, SystemNotifier};

#[cfg(target_os = "macos")]
mod system {
    use crossbeam_channel::Sender;
    use objc2::rc::Retained;
    use objc2::MainThreadMarker;
    use tracing::{debug, warn};

    use super::actions::{create_categories, NotificationResponse};
    use super::center::NotificationCenter;
    use super::delegate::NotificationDelegate;
    use super::request::create_notification_request;
    use super::{NotificationContent, NotificationError, Notifier};

    /// Registered action buttons. Clicks are forwarded while this is alive.
    pub struct NotificationActions {
        _delegate: Retained<NotificationDelegate>,
    }

    impl NotificationActions {
        /// Installs the delegate and the button categories.
        ///
        /// Returns `None` off the main thread.
        pub fn register(responses: Sender<NotificationResponse>) -> Option<Self> {
            let Some(mtm) = MainThreadMarker::new() else {
                let err = NotificationError::InitializationFailed(
                    "action buttons need the main thread".to_string(),
                );
                warn!(error = %err, "Notification actions unavailable");
                return None;
            };

            let delegate = NotificationDelegate::new(mtm, responses);
            NotificationCenter::set_delegate(&NotificationDelegate::as_protocol(&delegate));
            NotificationCenter::set_notification_categories(&create_categories());
            debug!("Notification actions registered");

            Some(Self {
                _delegate: delegate,
            })
        }
    }

    impl std::fmt::Debug for NotificationActions {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("NotificationActions").finish_non_exhaustive()
        }
    }

    /// Notifier backed by `UNUserNotificationCenter`.
    #[derive(Debug)]
    pub struct SystemNotifier {
        authorized: bool,
    }

    impl SystemNotifier {
        /// Requests authorization once and remembers the outcome.
        ///
        /// Never fails: without permission the notifier still exists and
        /// skips every delivery.
        pub async fn new() -> Self {
            let authorized = match NotificationCenter::request_authorization().await {
                Ok(granted) => granted,
                Err(e) => {
                    warn!(error = %e, "Notification authorization request failed");
                    NotificationCenter::is_authorized().await.unwrap_or(false)
                }
            };

            if !authorized {
                let err = NotificationError::PermissionDenied;
                warn!("{}. {}", err, err.suggestion());
            }

            Self { authorized }
        }

        #[must_use]
        pub fn is_authorized(&self) -> bool {
            self.authorized
        }
    }

    impl Notifier for SystemNotifier {
        fn deliver(&self, content: NotificationContent) -> Result<(), NotificationError> {
            if !self.authorized {
                debug!(identifier = %content.identifier, "Notifications not authorized, skipping");
                return Ok(());
            }

            let request = create_notification_request(&content);
            NotificationCenter::post_notification_request(&request, &content.identifier);
            debug!(identifier = %content.identifier, "Notification posted");
            Ok(())
        }
    }
}

/// Mock notifier for testing.
#[derive(Debug, Default)]
pub struct MockNotifier {
    delivered: Mutex<Vec<NotificationContent>>,
    should_fail: AtomicBool,
}

impl MockNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn delivered(&self) -> Vec<NotificationContent> {
        self.delivered.lock().unwrap().clone()
    }

    /// Identifiers of the delivered notifications, in order.
    #[must_use]
    pub fn identifiers(&self) -> Vec<String> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.identifier.clone())
            .collect()
    }

    #[must_use]
    pub fn notification_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    pub fn clear_recorded(&self) {
        self.delivered.lock().unwrap().clear();
    }
}

impl Notifier for MockNotifier {
    fn deliver(&self, content: NotificationContent) -> Result<(), NotificationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(NotificationError::SendFailed("Mock failure".to_string()));
        }
        self.delivered.lock().unwrap().push(content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_notifier_records_in_order() {
        let mock = MockNotifier::new();

        mock.notify_break_start(Duration::from_secs(300), false)
            .unwrap();
        mock.notify_break_end().unwrap();
        mock.notify_work_start().unwrap();

        assert_eq!(
            mock.identifiers(),
            vec![ids::BREAK_START, ids::BREAK_END, ids::WORK_START]
        );
        assert!(mock.delivered()[0].body.contains("5 minute"));

        mock.clear_recorded();
        assert_eq!(mock.notification_count(), 0);
    }

    #[test]
    fn test_mock_notifier_failure() {
        let mock = MockNotifier::new();
        mock.set_should_fail(true);

        assert!(matches!(
            mock.notify_break_end(),
            Err(NotificationError::SendFailed(_))
        ));
        assert_eq!(mock.notification_count(), 0);
    }

    #[test]
    fn test_arc_forwards() {
        let mock = Arc::new(MockNotifier::new());
        let shared: Arc<MockNotifier> = Arc::clone(&mock);

        shared.notify_break_start(Duration::from_secs(900), true).unwrap();
        assert!(mock.delivered()[0].title.contains("Long"));
    }

    #[test]
    fn test_log_notifier_never_fails() {
        let notifier = LogNotifier;
        assert!(notifier.notify_break_end().is_ok());
        assert!(notifier.notify_work_start().is_ok());
    }
}
