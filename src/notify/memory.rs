//! In-memory sink
//!
//! Records every delivered notification in a shared log. Clones share the
//! same log, so a caller can hand one clone to the engine and keep another to
//! inspect what was delivered. Attempts are recorded even when the sink is
//! switched into failing mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{Notification, NotificationSink, SinkError};

#[derive(Debug, Clone)]
pub struct MemorySink {
    name: String,
    attempts: Arc<Mutex<Vec<Notification>>>,
    delivered: Arc<Mutex<Vec<Notification>>>,
    failing: Arc<AtomicBool>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attempts: Arc::new(Mutex::new(Vec::new())),
            delivered: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a sink that rejects every notification
    pub fn failing(name: impl Into<String>) -> Self {
        let sink = Self::new(name);
        sink.set_failing(true);
        sink
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every notification this sink was asked to deliver, in order
    pub fn attempts(&self) -> Vec<Notification> {
        lock(&self.attempts).clone()
    }

    /// Notifications that were accepted, in order
    pub fn delivered(&self) -> Vec<Notification> {
        lock(&self.delivered).clone()
    }

    pub fn count(&self, notification: Notification) -> usize {
        lock(&self.delivered)
            .iter()
            .filter(|n| **n == notification)
            .count()
    }

    fn record(&self, notification: Notification) -> Result<(), SinkError> {
        lock(&self.attempts).push(notification);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Rejected(format!(
                "{} is in failing mode",
                self.name
            )));
        }
        lock(&self.delivered).push(notification);
        Ok(())
    }
}

// Poisoned logs are still read; pushes are the only writes.
fn lock(log: &Mutex<Vec<Notification>>) -> std::sync::MutexGuard<'_, Vec<Notification>> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl NotificationSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify_alert(&self) -> Result<(), SinkError> {
        self.record(Notification::Alert)
    }

    fn notify_resolve(&self) -> Result<(), SinkError> {
        self.record(Notification::Resolve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let sink = MemorySink::new("mem");
        let observer = sink.clone();

        sink.notify_alert().unwrap();
        sink.notify_resolve().unwrap();

        assert_eq!(
            observer.delivered(),
            vec![Notification::Alert, Notification::Resolve]
        );
        assert_eq!(observer.count(Notification::Alert), 1);
    }

    #[test]
    fn test_failing_mode_records_attempt_only() {
        let sink = MemorySink::failing("broken");

        let err = sink.notify_alert().unwrap_err();
        assert!(matches!(err, SinkError::Rejected(_)));
        assert_eq!(sink.attempts(), vec![Notification::Alert]);
        assert!(sink.delivered().is_empty());
    }

    #[test]
    fn test_failing_mode_can_be_cleared() {
        let sink = MemorySink::failing("flaky");
        assert!(sink.notify_alert().is_err());

        sink.set_failing(false);
        assert!(sink.notify_alert().is_ok());
        assert_eq!(sink.attempts().len(), 2);
        assert_eq!(sink.delivered(), vec![Notification::Alert]);
    }
}
