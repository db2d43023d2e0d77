//! Notification request creation.

use objc2::rc::Retained;
use objc2_foundation::NSString;
use objc2_user_notifications::{UNMutableNotificationContent, UNNotificationRequest};

use super::content::NotificationContent;

/// Builder for native notification content.
pub struct NativeContentBuilder {
    content: Retained<UNMutableNotificationContent>,
}

impl NativeContentBuilder {
    #[must_use]
    pub fn new() -> Self {
        let content = unsafe { UNMutableNotificationContent::new() };
        Self { content }
    }

    #[must_use]
    pub fn title(self, title: &str) -> Self {
        let title = NSString::from_str(title);
        unsafe {
            self.content.setTitle(&title);
        }
        self
    }

    #[must_use]
    pub fn body(self, body: &str) -> Self {
        let body = NSString::from_str(body);
        unsafe {
            self.content.setBody(&body);
        }
        self
    }

    /// Groups notifications of one kind in Notification Center.
    #[must_use]
    pub fn thread_identifier(self, thread: &str) -> Self {
        let thread = NSString::from_str(thread);
        unsafe {
            self.content.setThreadIdentifier(&thread);
        }
        self
    }

    /// Selects the registered category whose buttons are shown.
    #[must_use]
    pub fn category_identifier(self, category: &str) -> Self {
        let category = NSString::from_str(category);
        unsafe {
            self.content.setCategoryIdentifier(&category);
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Retained<UNMutableNotificationContent> {
        self.content
    }
}

impl Default for NativeContentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an immediate request whose identifier is the content's identifier.
#[must_use]
pub fn create_notification_request(content: &NotificationContent) -> Retained<UNNotificationRequest> {
    // Audio cues are played by the sound listener, so no notification sound.
    let mut builder = NativeContentBuilder::new()
        .title(&content.title)
        .body(&content.body)
        .thread_identifier("pomobar");
    if let Some(category) = &content.category {
        builder = builder.category_identifier(category);
    }
    let native = builder.build();
    let identifier = NSString::from_str(&content.identifier);

    UNNotificationRequest::requestWithIdentifier_content_trigger(&identifier, &native, None)
}
