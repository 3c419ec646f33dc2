//! Randomised ping simulation
//!
//! Drives a context in the foreground the way a real process would: one
//! evaluation per tick and a ping with a fixed probability after each one.
//! The run ends once no ping has been seen for `max_silence`, or after
//! `max_ticks` evaluations when set.

use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::liveness::{LivenessContext, LivenessState};

#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub ping_probability: f64,
    pub max_silence: chrono::Duration,
    pub max_ticks: Option<u64>,
    pub tick_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub ticks: u64,
    pub pings: u64,
    pub final_state: LivenessState,
}

/// Run the simulation, pinging at random
pub fn simulate(context: &mut LivenessContext, options: &SimulationOptions) -> SimulationReport {
    let probability = options.ping_probability;
    simulate_with(context, options, || rand::random::<f64>() < probability)
}

/// Run the simulation with a caller-supplied ping decision per tick
pub fn simulate_with<F>(
    context: &mut LivenessContext,
    options: &SimulationOptions,
    mut should_ping: F,
) -> SimulationReport
where
    F: FnMut() -> bool,
{
    let mut ticks = 0;
    let mut pings = 0;

    while context.elapsed(Utc::now()) < options.max_silence {
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }

        context.evaluate(Utc::now());
        ticks += 1;

        if should_ping() {
            info!("Ping");
            context.record_ping(Utc::now());
            pings += 1;
        }

        thread::sleep(options.tick_interval);
    }

    SimulationReport {
        ticks,
        pings,
        final_state: context.state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{MemorySink, Notification, NotificationSink};

    fn context_with(sink: &MemorySink, timeout_ms: i64) -> LivenessContext {
        LivenessContext::new(
            LivenessState::Alive,
            chrono::Duration::milliseconds(timeout_ms),
            vec![Box::new(sink.clone()) as Box<dyn NotificationSink>],
        )
    }

    #[test]
    fn test_silent_run_ends_dead_with_one_alert() {
        let sink = MemorySink::new("mem");
        let mut context = context_with(&sink, 30);
        let options = SimulationOptions {
            ping_probability: 0.0,
            max_silence: chrono::Duration::milliseconds(150),
            max_ticks: None,
            tick_interval: Duration::from_millis(5),
        };

        let report = simulate_with(&mut context, &options, || false);

        assert_eq!(report.pings, 0);
        assert!(report.ticks > 0);
        assert_eq!(report.final_state, LivenessState::Dead);
        assert_eq!(sink.delivered(), vec![Notification::Alert]);
    }

    #[test]
    fn test_constant_pings_stay_alive_until_tick_limit() {
        let sink = MemorySink::new("mem");
        let mut context = context_with(&sink, 1_000);
        let options = SimulationOptions {
            ping_probability: 1.0,
            max_silence: chrono::Duration::seconds(30),
            max_ticks: Some(5),
            tick_interval: Duration::from_millis(1),
        };

        let report = simulate(&mut context, &options);

        assert_eq!(report.ticks, 5);
        assert_eq!(report.pings, 5);
        assert_eq!(report.final_state, LivenessState::Alive);
        assert!(sink.attempts().is_empty());
    }

    #[test]
    fn test_zero_tick_limit_does_nothing() {
        let sink = MemorySink::new("mem");
        let mut context = context_with(&sink, 1_000);
        let options = SimulationOptions {
            ping_probability: 1.0,
            max_silence: chrono::Duration::seconds(30),
            max_ticks: Some(0),
            tick_interval: Duration::from_millis(1),
        };

        let report = simulate(&mut context, &options);
        assert_eq!(report.ticks, 0);
        assert_eq!(context.previous_state(), None);
    }
}
