//! Notification sinks and fan-out dispatch
//!
//! The liveness core only knows the [`NotificationSink`] capability. Concrete
//! transports live in the submodules:
//! - HTTP POST of a JSON payload (webhook)
//! - Structured log events
//! - External commands
//! - In-memory recording

pub mod command;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod log;
pub mod memory;

pub use command::CommandSink;
pub use dispatch::{dispatch_alert, dispatch_resolve};
pub use error::SinkError;
pub use http::HttpPostJsonSink;
pub use log::LogSink;
pub use memory::MemorySink;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of notification delivered to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Notification {
    /// Pings stopped arriving
    Alert,
    /// Pings resumed after an alert episode
    Resolve,
}

impl Notification {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Resolve => "resolve",
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A notification delivery target.
///
/// Implementations carry all of their configuration from construction time;
/// the core never passes anything beyond which notification to send.
pub trait NotificationSink: Send {
    /// Identity used in logs
    fn name(&self) -> &str;

    fn notify_alert(&self) -> Result<(), SinkError>;

    fn notify_resolve(&self) -> Result<(), SinkError>;

    /// Deliver the given notification kind
    fn notify(&self, notification: Notification) -> Result<(), SinkError> {
        match notification {
            Notification::Alert => self.notify_alert(),
            Notification::Resolve => self.notify_resolve(),
        }
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn notify_alert(&self) -> Result<(), SinkError> {
        (**self).notify_alert()
    }

    fn notify_resolve(&self) -> Result<(), SinkError> {
        (**self).notify_resolve()
    }
}
