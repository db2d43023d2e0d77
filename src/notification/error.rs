//! Notification system error types.
//!
//! Every error here is contained by the notification listener; a failed
//! delivery never reaches the timer engine.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to request notification authorization from the system.
    #[error("Failed to request notification authorization: {0}")]
    AuthorizationFailed(String),

    /// Failed to send a notification.
    #[error("Failed to send notification: {0}")]
    SendFailed(String),

    /// Notification permission was denied by the user.
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The binary is not code-signed (required for notifications on macOS).
    #[error("Binary is not code-signed; sign it with codesign")]
    UnsignedBinary,

    /// Failed to initialize the notification system.
    #[error("Failed to initialize notifications: {0}")]
    InitializationFailed(String),

    /// The notification center is not available.
    #[error("Notification center not available")]
    NotAvailable,
}

impl NotificationError {
    /// Returns true if this error is related to permissions.
    #[must_use]
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::AuthorizationFailed(_))
    }

    /// Returns true if this error might be resolved by code signing.
    #[must_use]
    pub fn requires_code_signing(&self) -> bool {
        matches!(self, Self::UnsignedBinary)
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::AuthorizationFailed(_) | Self::PermissionDenied => {
                "Allow notifications in System Settings > Notifications"
            }
            Self::UnsignedBinary => "codesign --force --deep --sign - target/release/pomobar",
            Self::SendFailed(_) => "Check the Notification Center",
            Self::InitializationFailed(_) => "Restart the daemon",
            Self::NotAvailable => "Notifications require macOS; run with --no-notifications",
        }
    }
}
