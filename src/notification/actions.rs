//! Notification action buttons and the timer operations behind them.
//!
//! Break notifications carry buttons to start the break now or skip it; the
//! break-end notification carries one to start working. A click arrives as a
//! [`NotificationResponse`] and is turned into a [`NotificationAction`] for
//! the daemon loop.

use super::content::ids;

/// Notification action identifiers.
pub mod action_ids {
    /// Start the announced phase right away.
    pub const START_NOW: &str = "pomobar.action.start";
    /// Skip the announced break and keep working.
    pub const SKIP_BREAK: &str = "pomobar.action.skip";
    /// The notification itself was clicked.
    pub const DEFAULT: &str = "com.apple.UNNotificationDefaultActionIdentifier";
    /// The notification was dismissed.
    pub const DISMISS: &str = "com.apple.UNNotificationDismissActionIdentifier";
}

/// Notification category identifiers.
pub mod category_ids {
    pub const SHORT_BREAK: &str = "pomobar.category.break.short";
    pub const LONG_BREAK: &str = "pomobar.category.break.long";
    pub const BREAK_END: &str = "pomobar.category.break.end";
}

/// A click on a delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResponse {
    /// Request identifier of the clicked notification
    pub notification_id: String,
    /// Identifier of the clicked button, or one of the system identifiers
    pub action_id: String,
}

impl NotificationResponse {
    #[must_use]
    pub fn new(notification_id: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            notification_id: notification_id.into(),
            action_id: action_id.into(),
        }
    }

    /// The timer operation this click asks for, if any.
    ///
    /// Clicking the body or dismissing asks for nothing.
    #[must_use]
    pub fn action(&self) -> Option<NotificationAction> {
        match (self.notification_id.as_str(), self.action_id.as_str()) {
            (ids::BREAK_START, action_ids::START_NOW) => Some(NotificationAction::StartBreak),
            (ids::BREAK_START, action_ids::SKIP_BREAK) => Some(NotificationAction::SkipBreak),
            (ids::BREAK_END, action_ids::START_NOW) => Some(NotificationAction::StartWork),
            _ => None,
        }
    }
}

/// Timer operation requested from a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Start the pending break
    StartBreak,
    /// Leave the break and start working
    SkipBreak,
    /// Start the next work phase
    StartWork,
}

#[cfg(target_os = "macos")]
pub use self::native::create_categories;

#[cfg(target_os = "macos")]
mod native {
    use objc2::rc::Retained;
    use objc2_foundation::{NSArray, NSString};
    use objc2_user_notifications::{
        UNNotificationAction, UNNotificationActionOptions, UNNotificationCategory,
        UNNotificationCategoryOptions,
    };

    use super::{action_ids, category_ids};

    fn create_action(
        identifier: &str,
        title: &str,
        options: UNNotificationActionOptions,
    ) -> Retained<UNNotificationAction> {
        let identifier = NSString::from_str(identifier);
        let title = NSString::from_str(title);

        unsafe { UNNotificationAction::actionWithIdentifier_title_options(&identifier, &title, options) }
    }

    fn create_category(
        identifier: &str,
        actions: &[Retained<UNNotificationAction>],
    ) -> Retained<UNNotificationCategory> {
        let identifier = NSString::from_str(identifier);

        let refs: Vec<&UNNotificationAction> = actions.iter().map(|a| a.as_ref()).collect();
        let actions_array: Retained<NSArray<UNNotificationAction>> = NSArray::from_slice(&refs);
        let intent_identifiers: Retained<NSArray<NSString>> =
            NSArray::from_slice(&[] as &[&NSString]);

        unsafe {
            UNNotificationCategory::categoryWithIdentifier_actions_intentIdentifiers_options(
                &identifier,
                &actions_array,
                &intent_identifiers,
                UNNotificationCategoryOptions::CustomDismissAction,
            )
        }
    }

    /// Creates the categories for break-start and break-end notifications.
    #[must_use]
    pub fn create_categories() -> Vec<Retained<UNNotificationCategory>> {
        let skip = create_action(
            action_ids::SKIP_BREAK,
            "Keep working",
            UNNotificationActionOptions::empty(),
        );
        let start_short = create_action(
            action_ids::START_NOW,
            "Start short break",
            UNNotificationActionOptions::Foreground,
        );
        let start_long = create_action(
            action_ids::START_NOW,
            "Start long break",
            UNNotificationActionOptions::Foreground,
        );
        let start_work = create_action(
            action_ids::START_NOW,
            "Start working",
            UNNotificationActionOptions::Foreground,
        );

        vec![
            create_category(category_ids::SHORT_BREAK, &[start_short, skip.clone()]),
            create_category(category_ids::LONG_BREAK, &[start_long, skip]),
            create_category(category_ids::BREAK_END, &[start_work]),
        ]
    }
}
