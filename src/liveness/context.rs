//! The mutable liveness record owned by the evaluation loop

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::machine;
use super::state::LivenessState;
use crate::notify::NotificationSink;

/// Current liveness of the monitored process plus the sinks to notify.
///
/// `state` only changes through [`evaluate`](Self::evaluate); `last_ping_at`
/// only changes through [`record_ping`](Self::record_ping).
pub struct LivenessContext {
    pub(super) state: LivenessState,
    pub(super) previous_state: Option<LivenessState>,
    pub(super) last_ping_at: DateTime<Utc>,
    pub(super) timeout: Duration,
    pub(super) alert_sent: bool,
    pub(super) resolve_sent: bool,
    pub(super) sinks: Vec<Box<dyn NotificationSink>>,
}

impl LivenessContext {
    /// Create a context whose last ping is "now"
    pub fn new(
        initial_state: LivenessState,
        timeout: Duration,
        sinks: Vec<Box<dyn NotificationSink>>,
    ) -> Self {
        Self::starting_at(initial_state, timeout, sinks, Utc::now())
    }

    /// Create a context whose last ping is `now`
    pub fn starting_at(
        initial_state: LivenessState,
        timeout: Duration,
        sinks: Vec<Box<dyn NotificationSink>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            state: initial_state,
            previous_state: None,
            last_ping_at: now,
            timeout,
            alert_sent: false,
            resolve_sent: false,
            sinks,
        }
    }

    /// Start with the alert flag already set, as if this episode was notified
    pub fn with_alert_sent(mut self, sent: bool) -> Self {
        self.alert_sent = sent;
        self
    }

    /// Start with the resolve flag already set
    pub fn with_resolve_sent(mut self, sent: bool) -> Self {
        self.resolve_sent = sent;
        self
    }

    /// Run one evaluation tick
    pub fn evaluate(&mut self, now: DateTime<Utc>) {
        machine::evaluate(self, now);
    }

    /// Record a liveness signal received at `at`
    pub fn record_ping(&mut self, at: DateTime<Utc>) {
        self.last_ping_at = at;
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.last_ping_at)
    }

    pub fn state(&self) -> LivenessState {
        self.state
    }

    pub fn previous_state(&self) -> Option<LivenessState> {
        self.previous_state
    }

    pub fn last_ping_at(&self) -> DateTime<Utc> {
        self.last_ping_at
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn alert_sent(&self) -> bool {
        self.alert_sent
    }

    pub fn resolve_sent(&self) -> bool {
        self.resolve_sent
    }

    pub fn sinks(&self) -> &[Box<dyn NotificationSink>] {
        &self.sinks
    }

    pub fn sink_names(&self) -> Vec<String> {
        self.sinks.iter().map(|s| s.name().to_string()).collect()
    }

    pub(super) fn clear_notification_flags(&mut self) {
        self.alert_sent = false;
        self.resolve_sent = false;
    }

    /// Point-in-time copy for status reporting
    pub fn snapshot(&self, now: DateTime<Utc>) -> LivenessSnapshot {
        LivenessSnapshot {
            state: self.state,
            previous_state: self.previous_state,
            last_ping_at: self.last_ping_at,
            elapsed_ms: self.elapsed(now).num_milliseconds(),
            timeout_ms: self.timeout.num_milliseconds(),
            alert_sent: self.alert_sent,
            resolve_sent: self.resolve_sent,
            sinks: self.sink_names(),
        }
    }
}

impl fmt::Debug for LivenessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivenessContext")
            .field("state", &self.state)
            .field("previous_state", &self.previous_state)
            .field("last_ping_at", &self.last_ping_at)
            .field("timeout", &self.timeout)
            .field("alert_sent", &self.alert_sent)
            .field("resolve_sent", &self.resolve_sent)
            .field("sinks", &self.sink_names())
            .finish()
    }
}

/// Serializable view of a [`LivenessContext`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessSnapshot {
    pub state: LivenessState,
    #[serde(default)]
    pub previous_state: Option<LivenessState>,
    pub last_ping_at: DateTime<Utc>,
    /// Time since the last ping when the snapshot was taken
    pub elapsed_ms: i64,
    pub timeout_ms: i64,
    pub alert_sent: bool,
    pub resolve_sent: bool,
    /// Sink names in dispatch order
    #[serde(default)]
    pub sinks: Vec<String>,
}

impl LivenessSnapshot {
    /// Time left before the switch trips, zero once expired
    pub fn remaining_ms(&self) -> i64 {
        (self.timeout_ms - self.elapsed_ms).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{LogSink, MemorySink};

    #[test]
    fn test_new_context_defaults() {
        let now = Utc::now();
        let context =
            LivenessContext::starting_at(LivenessState::Alive, Duration::seconds(10), vec![], now);

        assert_eq!(context.state(), LivenessState::Alive);
        assert_eq!(context.previous_state(), None);
        assert_eq!(context.last_ping_at(), now);
        assert!(!context.alert_sent());
        assert!(!context.resolve_sent());
        assert!(context.sinks().is_empty());
    }

    #[test]
    fn test_record_ping_updates_elapsed() {
        let start = Utc::now();
        let mut context =
            LivenessContext::starting_at(LivenessState::Alive, Duration::seconds(10), vec![], start);

        let later = start + Duration::seconds(7);
        assert_eq!(context.elapsed(later), Duration::seconds(7));

        context.record_ping(later);
        assert_eq!(context.last_ping_at(), later);
        assert_eq!(context.elapsed(later), Duration::zero());
    }

    #[test]
    fn test_record_ping_does_not_touch_state() {
        let mut context = LivenessContext::new(LivenessState::Dead, Duration::seconds(10), vec![])
            .with_alert_sent(true);

        context.record_ping(Utc::now());
        assert_eq!(context.state(), LivenessState::Dead);
        assert!(context.alert_sent());
    }

    #[test]
    fn test_sink_names_keep_registration_order() {
        let context = LivenessContext::new(
            LivenessState::Alive,
            Duration::seconds(10),
            vec![
                Box::new(MemorySink::new("first")),
                Box::new(LogSink::new("second")),
            ],
        );
        assert_eq!(context.sink_names(), vec!["first", "second"]);
    }

    #[test]
    fn test_snapshot() {
        let start = Utc::now();
        let context = LivenessContext::starting_at(
            LivenessState::Dead,
            Duration::seconds(10),
            vec![Box::new(MemorySink::new("mem"))],
            start,
        )
        .with_alert_sent(true);

        let snapshot = context.snapshot(start + Duration::seconds(4));
        assert_eq!(snapshot.state, LivenessState::Dead);
        assert_eq!(snapshot.previous_state, None);
        assert_eq!(snapshot.elapsed_ms, 4_000);
        assert_eq!(snapshot.timeout_ms, 10_000);
        assert_eq!(snapshot.remaining_ms(), 6_000);
        assert!(snapshot.alert_sent);
        assert!(!snapshot.resolve_sent);
        assert_eq!(snapshot.sinks, vec!["mem"]);
    }

    #[test]
    fn test_snapshot_remaining_never_negative() {
        let start = Utc::now();
        let context =
            LivenessContext::starting_at(LivenessState::Alive, Duration::seconds(1), vec![], start);
        let snapshot = context.snapshot(start + Duration::seconds(30));
        assert_eq!(snapshot.remaining_ms(), 0);
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let context = LivenessContext::new(LivenessState::Alive, Duration::seconds(5), vec![]);
        let snapshot = context.snapshot(Utc::now());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"state\":\"alive\""));
        let parsed: LivenessSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_debug_lists_sink_names() {
        let context = LivenessContext::new(
            LivenessState::Alive,
            Duration::seconds(5),
            vec![Box::new(MemorySink::new("mem"))],
        );
        let debug = format!("{:?}", context);
        assert!(debug.contains("mem"));
        assert!(debug.contains("Alive"));
    }
}
