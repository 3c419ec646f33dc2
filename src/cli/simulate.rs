//! `deadman simulate` command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Config;
use crate::liveness::LivenessContext;
use crate::simulate::{simulate, SimulationOptions};

#[derive(Args)]
pub struct SimulateArgs {
    /// Path to the configuration file
    #[arg(long, env = "DEADMAN_SWITCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chance of a ping after each tick (0.0 to 1.0)
    #[arg(long, default_value_t = 0.2, value_parser = parse_probability)]
    pub ping_probability: f64,

    /// Stop once no ping has been seen for this many seconds
    #[arg(long, default_value_t = 30)]
    pub max_silence_secs: u64,

    /// Stop after this many ticks
    #[arg(long)]
    pub max_ticks: Option<u64>,
}

fn parse_probability(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("invalid probability: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("probability must be between 0 and 1, got {value}"))
    }
}

pub async fn run(args: SimulateArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let max_silence = i64::try_from(args.max_silence_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .context("max-silence-secs is too large")?;

    let options = SimulationOptions {
        ping_probability: args.ping_probability,
        max_silence,
        max_ticks: args.max_ticks,
        tick_interval: config.tick_interval(),
    };

    // Sinks may block on network I/O, keep them off the async runtime
    let report = tokio::task::spawn_blocking(move || {
        let mut context =
            LivenessContext::new(config.initial_state, config.timeout(), config.build_sinks());
        simulate(&mut context, &options)
    })
    .await
    .context("Simulation task failed")?;

    println!(
        "Simulation finished after {} ticks and {} pings: {} {}",
        report.ticks,
        report.pings,
        report.final_state.emoji(),
        report.final_state
    );
    Ok(())
}
