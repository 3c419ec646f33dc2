//! `deadman run` command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::config::Config;
use crate::daemon;

#[derive(Args)]
pub struct RunArgs {
    /// Path to the configuration file
    #[arg(long, env = "DEADMAN_SWITCH_CONFIG")]
    pub config: Option<PathBuf>,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    info!(
        timeout_secs = config.timeout_secs,
        tick_interval_ms = config.tick_interval_ms,
        initial_state = %config.initial_state,
        sinks = config.sinks.len(),
        "Starting deadman switch"
    );

    daemon::run(config).await
}
