//! Sink that runs an external command for every notification
//!
//! The command receives `DEADMAN_EVENT=alert` or `DEADMAN_EVENT=resolve` in its
//! environment. A non-zero exit, a spawn failure or running past the sink's
//! timeout counts as a failed delivery; a timed-out child is killed.

use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::error::Result;
use super::{Notification, NotificationSink, SinkError};

pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Environment variable carrying the notification kind
pub const EVENT_ENV_VAR: &str = "DEADMAN_EVENT";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone)]
pub struct CommandSink {
    name: String,
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandSink {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, notification: Notification) -> Result<()> {
        debug!(
            sink = %self.name,
            "Running {} {:?} for {}", self.program, self.args, notification
        );

        if self.timeout.is_zero() {
            return Err(SinkError::Misconfigured(
                "command timeout must be greater than zero".to_string(),
            ));
        }
        let deadline = Instant::now().checked_add(self.timeout).ok_or_else(|| {
            SinkError::Misconfigured(format!("command timeout {:?} is too large", self.timeout))
        })?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(EVENT_ENV_VAR, notification.label())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        loop {
            if let Some(status) = child.try_wait()? {
                if status.success() {
                    return Ok(());
                }
                return Err(SinkError::CommandFailed(format!(
                    "{} exited with: {}",
                    self.program, status
                )));
            }

            if Instant::now() >= deadline {
                if let Err(e) = child.kill() {
                    debug!(sink = %self.name, "Failed to kill timed out command: {}", e);
                }
                // Reap so the child does not linger as a zombie
                let _ = child.wait();
                return Err(SinkError::CommandTimedOut(self.timeout));
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl NotificationSink for CommandSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify_alert(&self) -> Result<()> {
        self.run(Notification::Alert)
    }

    fn notify_resolve(&self) -> Result<()> {
        self.run(Notification::Resolve)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_successful_command() {
        let sink = CommandSink::new("true");
        assert_eq!(sink.name(), "true");
        assert!(sink.notify_alert().is_ok());
    }

    #[test]
    fn test_failing_command() {
        let sink = CommandSink::new("false").with_name("always-fails");
        assert!(matches!(
            sink.notify_resolve(),
            Err(SinkError::CommandFailed(_))
        ));
    }

    #[test]
    fn test_event_is_passed_in_environment() {
        let sink = CommandSink::new("sh").with_args(["-c", "test \"$DEADMAN_EVENT\" = alert"]);
        assert!(sink.notify_alert().is_ok());
        assert!(sink.notify_resolve().is_err());
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let sink = CommandSink::new("/nonexistent/deadman-hook");
        assert!(matches!(sink.notify_alert(), Err(SinkError::IoError(_))));
    }

    #[test]
    fn test_slow_command_times_out() {
        let sink = CommandSink::new("sleep")
            .with_args(["5"])
            .with_timeout(Duration::from_millis(100));

        let started = Instant::now();
        let result = sink.notify_alert();
        assert!(matches!(result, Err(SinkError::CommandTimedOut(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_zero_timeout_is_misconfigured() {
        let sink = CommandSink::new("true").with_timeout(Duration::ZERO);
        assert!(matches!(
            sink.notify_alert(),
            Err(SinkError::Misconfigured(_))
        ));
    }

    #[test]
    fn test_huge_timeout_is_misconfigured_not_a_panic() {
        let sink = CommandSink::new("true").with_timeout(Duration::MAX);
        assert!(matches!(
            sink.notify_alert(),
            Err(SinkError::Misconfigured(_))
        ));
    }
}
