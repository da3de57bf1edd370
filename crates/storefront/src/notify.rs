//! User-facing notification signals.
//!
//! Store mutations emit `{ title, description, variant }` tuples; the UI
//! layer (out of scope here) renders and dismisses them. The [`Notifier`]
//! trait is the seam: the engine never knows how, or whether, a notification
//! is displayed.

use std::sync::{Mutex, PoisonError};

/// Visual severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationVariant {
    /// Neutral/confirmation styling.
    #[default]
    Default,
    /// Failure styling.
    Destructive,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    /// Create a confirmation notification.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Default,
        }
    }

    /// Create a failure notification.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that routes notifications through `tracing`.
///
/// The default sink when no UI is attached; destructive notifications log at
/// `warn` so they stay visible in production logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.variant {
            NotificationVariant::Default => tracing::info!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
            NotificationVariant::Destructive => tracing::warn!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
        }
    }
}

/// Notifier that queues notifications for later consumption.
///
/// A UI layer polls [`BufferNotifier::drain`] each frame; tests assert on
/// the drained sequence.
#[derive(Debug, Default)]
pub struct BufferNotifier {
    queue: Mutex<Vec<Notification>>,
}

impl BufferNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all queued notifications, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        let mut queue = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *queue)
    }
}

impl Notifier for BufferNotifier {
    fn notify(&self, notification: Notification) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
