//! Fan-out of a notification to every registered sink
//!
//! Each sink is called in registration order inside its own isolation
//! boundary: an error or a panic from one sink is logged with the sink's name
//! and never stops delivery to the sinks after it. The overall result only
//! says whether there was anyone to notify; per-sink outcomes do not affect
//! it, and nothing is retried within the same call.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info, warn};

use super::{Notification, NotificationSink};

/// Send an alert to every sink. Returns `false` when no sinks are configured.
pub fn dispatch_alert<S: NotificationSink>(sinks: &[S]) -> bool {
    dispatch(sinks, Notification::Alert)
}

/// Send a resolve to every sink. Returns `false` when no sinks are configured.
pub fn dispatch_resolve<S: NotificationSink>(sinks: &[S]) -> bool {
    dispatch(sinks, Notification::Resolve)
}

fn dispatch<S: NotificationSink>(sinks: &[S], notification: Notification) -> bool {
    if sinks.is_empty() {
        warn!(
            notification = notification.label(),
            "No sinks configured, {} not sent", notification
        );
        return false;
    }

    for sink in sinks {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.notify(notification)));
        match outcome {
            Ok(Ok(())) => {
                info!(
                    sink = sink.name(),
                    notification = notification.label(),
                    "Delivered {}", notification
                );
            }
            Ok(Err(e)) => {
                error!(
                    sink = sink.name(),
                    notification = notification.label(),
                    "Failed to deliver {}: {}", notification, e
                );
            }
            Err(payload) => {
                error!(
                    sink = sink.name(),
                    notification = notification.label(),
                    "Sink panicked while delivering {}: {}",
                    notification,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    true
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemorySink, SinkError};

    struct PanickingSink;

    impl NotificationSink for PanickingSink {
        fn name(&self) -> &str {
            "panicking"
        }

        fn notify_alert(&self) -> Result<(), SinkError> {
            panic!("alert transport exploded")
        }

        fn notify_resolve(&self) -> Result<(), SinkError> {
            panic!("resolve transport exploded")
        }
    }

    #[test]
    fn test_zero_sinks_reports_not_sent() {
        let sinks: Vec<MemorySink> = Vec::new();
        assert!(!dispatch_alert(&sinks));
        assert!(!dispatch_resolve(&sinks));
    }

    #[test]
    fn test_all_sinks_notified_in_order() {
        let a = MemorySink::new("a");
        let b = MemorySink::new("b");
        let sinks = vec![a.clone(), b.clone()];

        assert!(dispatch_alert(&sinks));
        assert_eq!(a.delivered(), vec![Notification::Alert]);
        assert_eq!(b.delivered(), vec![Notification::Alert]);
    }

    #[test]
    fn test_failing_sink_does_not_stop_later_sinks() {
        let first = MemorySink::new("first");
        let broken = MemorySink::failing("broken");
        let last = MemorySink::new("last");
        let sinks = vec![first.clone(), broken.clone(), last.clone()];

        assert!(dispatch_resolve(&sinks));
        assert_eq!(first.delivered(), vec![Notification::Resolve]);
        assert_eq!(broken.attempts(), vec![Notification::Resolve]);
        assert!(broken.delivered().is_empty());
        assert_eq!(last.delivered(), vec![Notification::Resolve]);
    }

    #[test]
    fn test_every_sink_failing_still_counts_as_sent() {
        let sinks = vec![MemorySink::failing("x"), MemorySink::failing("y")];
        assert!(dispatch_alert(&sinks));
        assert_eq!(sinks[0].attempts().len(), 1);
        assert_eq!(sinks[1].attempts().len(), 1);
    }

    #[test]
    fn test_panicking_sink_is_isolated() {
        let after = MemorySink::new("after");
        let sinks: Vec<Box<dyn NotificationSink>> =
            vec![Box::new(PanickingSink), Box::new(after.clone())];

        assert!(dispatch_alert(&sinks));
        assert_eq!(after.delivered(), vec![Notification::Alert]);
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn std::any::Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
