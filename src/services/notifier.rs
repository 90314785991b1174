use crate::domain::{Notification, Severity};
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// Single-slot transient message surface. A new notification replaces the
/// current one; nothing is queued.
#[derive(Debug)]
pub struct Notifier {
    duration: Duration,
    current: Mutex<Option<Notification>>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: Mutex::new(None),
        }
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Error => error!(%severity, "{message}"),
            _ => info!(%severity, "{message}"),
        }

        let raised_at = Instant::now();
        *self.current.lock() = Some(Notification {
            message,
            severity,
            raised_at,
            expires_at: raised_at + self.duration,
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(message, Severity::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(message, Severity::Error);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(message, Severity::Info);
    }

    /// Manual acknowledgment.
    pub fn dismiss(&self) {
        if self.current.lock().take().is_some() {
            debug!("notification dismissed");
        }
    }

    /// The visible notification, if it has not expired yet.
    pub fn active(&self) -> Option<Notification> {
        let mut current = self.current.lock();
        if current
            .as_ref()
            .is_some_and(|n| n.is_expired(Instant::now()))
        {
            *current = None;
        }
        current.clone()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notification_auto_clears_after_duration() {
        let notifier = Notifier::default();
        notifier.success("Container created");

        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert_eq!(
            notifier.active().map(|n| n.message),
            Some("Container created".to_string())
        );

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(notifier.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_notification_replaces_current() {
        let notifier = Notifier::default();
        notifier.info("Deploying wordpress:latest with its database...");

        tokio::time::advance(Duration::from_secs(2)).await;
        notifier.error("Error creating container");

        let active = notifier.active().unwrap();
        assert_eq!(active.message, "Error creating container");
        assert_eq!(active.severity, Severity::Error);

        // The replacement gets its own full window.
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(notifier.active().is_some());
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(notifier.active().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_clears_early() {
        let notifier = Notifier::default();
        notifier.success("Container started");
        notifier.dismiss();
        assert!(notifier.active().is_none());
    }
}
