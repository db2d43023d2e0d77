//! Notification content construction.
//!
//! Content is plain data so it can be built and checked on every platform;
//! the macOS backend converts it to `UNMutableNotificationContent`.

use std::time::Duration;

use super::actions::category_ids;

/// Fixed request identifiers. A new notification of the same kind replaces
/// the previous one in Notification Center.
pub mod ids {
    pub const BREAK_START: &str = "pomobar.break.start";
    pub const BREAK_END: &str = "pomobar.break.end";
    pub const WORK_START: &str = "pomobar.work.start";
}

/// A notification ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub identifier: String,
    pub title: String,
    pub body: String,
    /// Category selecting the action buttons shown
    pub category: Option<String>,
}

impl NotificationContent {
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            body: body.into(),
            category: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// Whole minutes of a duration, rounded down.
#[must_use]
pub fn whole_minutes(duration: Duration) -> u64 {
    duration.as_secs() / 60
}

/// Content announcing that a break begins.
#[must_use]
pub fn break_start_content(duration: Duration, is_long_break: bool) -> NotificationContent {
    let minutes = whole_minutes(duration);
    if is_long_break {
        NotificationContent::new(
            ids::BREAK_START,
            "☕ Long break",
            format!("Great work! Take a {minutes} minute break and step away from the screen."),
        )
        .with_category(category_ids::LONG_BREAK)
    } else {
        NotificationContent::new(
            ids::BREAK_START,
            "☕ Short break",
            format!("Take a {minutes} minute break. Stretch and rest your eyes."),
        )
        .with_category(category_ids::SHORT_BREAK)
    }
}

/// Content announcing that a break is over.
#[must_use]
pub fn break_end_content() -> NotificationContent {
    NotificationContent::new(
        ids::BREAK_END,
        "⏰ Break is over",
        "Time to get back to focused work.",
    )
    .with_category(category_ids::BREAK_END)
}

/// Content announcing that a work session began.
#[must_use]
pub fn work_start_content() -> NotificationContent {
    NotificationContent::new(
        ids::WORK_START,
        "🍅 Focus time",
        "A new work session has started.",
    )
}
