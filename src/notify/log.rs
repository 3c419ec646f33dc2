//! Sink that reports notifications as log events

use tracing::{info, warn};

use super::{NotificationSink, SinkError};

pub const DEFAULT_LOG_SINK_NAME: &str = "log";

#[derive(Debug, Clone)]
pub struct LogSink {
    name: String,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_SINK_NAME)
    }
}

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify_alert(&self) -> Result<(), SinkError> {
        warn!(sink = %self.name, "Deadman alert: no ping received within the timeout");
        Ok(())
    }

    fn notify_resolve(&self) -> Result<(), SinkError> {
        info!(sink = %self.name, "Deadman resolved: pings are arriving again");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sink_never_fails() {
        let sink = LogSink::default();
        assert_eq!(sink.name(), "log");
        assert!(sink.notify_alert().is_ok());
        assert!(sink.notify_resolve().is_ok());
    }
}
