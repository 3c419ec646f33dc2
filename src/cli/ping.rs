//! `deadman ping` command implementation

use anyhow::Result;
use clap::Args;

use crate::config::DEFAULT_LISTEN_ADDRESS;
use crate::daemon::client;

#[derive(Args)]
pub struct PingArgs {
    /// Address of the running daemon
    #[arg(long, env = "DEADMAN_SWITCH_ADDRESS", default_value = DEFAULT_LISTEN_ADDRESS)]
    pub address: String,

    /// Do not print anything on success
    #[arg(short, long)]
    pub quiet: bool,
}

pub async fn run(args: PingArgs) -> Result<()> {
    client::ping(&args.address).await?;
    if !args.quiet {
        println!("✓ Ping sent to {}", args.address);
    }
    Ok(())
}
