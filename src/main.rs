//! deadman - dead man's switch daemon and client

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use deadman_switch::cli::{self, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = if std::env::var("DEADMAN_SWITCH_DEBUG").is_ok() {
        EnvFilter::new("deadman_switch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deadman_switch=info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Completion { shell } => {
            generate(shell, &mut Cli::command(), "deadman", &mut std::io::stdout());
            Ok(())
        }
        Commands::Run(args) => cli::run::run(args).await,
        Commands::Ping(args) => cli::ping::run(args).await,
        Commands::Status(args) => cli::status::run(args).await,
        Commands::Check(args) => cli::check::run(args).await,
        Commands::Simulate(args) => cli::simulate::run(args).await,
    }
}
