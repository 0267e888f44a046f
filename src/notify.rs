//! Device notifications for newly arrived orders.
//!
//! Delivery is best-effort: the reconciler logs a failed or denied notification and
//! carries on with the order.

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    /// The user has not been asked yet.
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification permission not granted")]
    PermissionDenied,

    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    /// Prompts the user if they have not decided yet; returns the resulting permission.
    async fn request_permission(&self) -> NotificationPermission {
        self.permission()
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Logs notifications instead of showing them.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(title, body, "Notification shown");
        Ok(())
    }
}

/// Keeps every delivered notification. A `Default` permission turns into `Granted`
/// when requested, as if the user accepted the prompt.
pub struct RecordingNotifier {
    permission: Mutex<NotificationPermission>,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        Self {
            permission: Mutex::new(permission),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn granted() -> Self {
        Self::new(NotificationPermission::Granted)
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> NotificationPermission {
        *self.permission.lock()
    }

    async fn request_permission(&self) -> NotificationPermission {
        let mut permission = self.permission.lock();
        if *permission == NotificationPermission::Default {
            *permission = NotificationPermission::Granted;
        }
        *permission
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        if self.permission() != NotificationPermission::Granted {
            return Err(NotifyError::PermissionDenied);
        }
        self.sent.lock().push((title.to_string(), body.to_string()));
        Ok(())
    }
}
