//! User-facing messages raised by the controller
//!
//! Alerts stay on screen until dismissed and block other input, like a
//! browser `alert()`. Toasts expire on their own.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    /// `None` for alerts
    pub expires_at: Option<Instant>,
}

impl Notification {
    pub fn toast(message: impl Into<String>, level: NotificationLevel, duration: Duration) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: Some(Instant::now() + duration),
        }
    }

    pub fn alert(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            expires_at: None,
        }
    }

    pub fn is_alert(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Newest first
#[derive(Debug)]
pub struct NotificationManager {
    notifications: Vec<Notification>,
    toast_duration: Duration,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::with_toast_duration(Duration::from_secs(4))
    }

    pub fn with_toast_duration(toast_duration: Duration) -> Self {
        Self {
            notifications: Vec::new(),
            toast_duration,
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let toast = Notification::toast(message, NotificationLevel::Info, self.toast_duration);
        self.notifications.insert(0, toast);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let toast = Notification::toast(message, NotificationLevel::Warning, self.toast_duration);
        self.notifications.insert(0, toast);
    }

    pub fn alert(&mut self, message: impl Into<String>, level: NotificationLevel) {
        self.notifications.insert(0, Notification::alert(message, level));
    }

    /// Drop expired toasts. Returns true if anything was removed.
    pub fn update(&mut self) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| !n.is_expired());
        self.notifications.len() != before
    }

    pub fn current(&self) -> Option<&Notification> {
        self.notifications.first()
    }

    /// The newest alert still waiting to be acknowledged
    pub fn pending_alert(&self) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.is_alert())
    }

    pub fn dismiss_alert(&mut self) -> bool {
        match self.notifications.iter().position(Notification::is_alert) {
            Some(pos) => {
                self.notifications.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn all(&self) -> &[Notification] {
        &self.notifications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn toasts_expire_alerts_do_not() {
        let mut manager = NotificationManager::with_toast_duration(Duration::from_millis(20));
        manager.info("saved");
        manager.alert("Only PDF files are allowed.", NotificationLevel::Error);

        thread::sleep(Duration::from_millis(40));
        assert!(manager.update());
        assert_eq!(manager.all().len(), 1);
        assert_eq!(
            manager.pending_alert().map(|n| n.message.as_str()),
            Some("Only PDF files are allowed.")
        );
    }

    #[test]
    fn dismiss_removes_newest_alert_only() {
        let mut manager = NotificationManager::new();
        manager.alert("first", NotificationLevel::Warning);
        manager.warn("toast");
        manager.alert("second", NotificationLevel::Error);

        assert_eq!(manager.current().unwrap().message, "second");
        assert!(manager.dismiss_alert());
        assert_eq!(manager.pending_alert().unwrap().message, "first");
        assert!(manager.dismiss_alert());
        assert!(!manager.dismiss_alert());
        assert_eq!(manager.all().len(), 1);
    }
}
