//! `deadman check` command implementation

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use crate::config::{default_config_path, Config};

#[derive(Args)]
pub struct CheckArgs {
    /// Path to the configuration file
    #[arg(long, env = "DEADMAN_SWITCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML
    #[arg(long)]
    pub print: bool,
}

pub async fn run(args: CheckArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;

    match args.config.as_ref().or(default_config_path().as_ref()) {
        Some(path) if path.exists() => println!("Config: {}", path.display()),
        _ => println!("Config: built-in defaults"),
    }
    println!("  timeout:       {}s", config.timeout_secs);
    println!("  tick interval: {}ms", config.tick_interval_ms);
    println!("  initial state: {}", config.initial_state);
    println!("  listener:      {}", config.listener.address);

    if config.sinks.is_empty() {
        println!("\n⚠ No sinks configured: alerts will only be logged as warnings");
    } else {
        println!("\nSinks:");
    }

    let mut problems = 0;
    for sink in &config.sinks {
        match sink.problem() {
            None => println!("  ✓ {:<8} {}", sink.kind(), sink.display_name()),
            Some(reason) => {
                problems += 1;
                println!("  ✗ {:<8} {}: {}", sink.kind(), sink.display_name(), reason);
            }
        }
    }

    if args.print {
        println!("\n{}", config.to_toml()?);
    }

    if problems > 0 {
        bail!("{} sink(s) misconfigured", problems);
    }
    Ok(())
}
