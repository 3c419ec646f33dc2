//! CLI argument definitions

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use super::check::CheckArgs;
use super::ping::PingArgs;
use super::run::RunArgs;
use super::simulate::SimulateArgs;
use super::status::StatusArgs;

#[derive(Parser)]
#[command(name = "deadman")]
#[command(about = "Dead man's switch: alert when pings stop, resolve when they return")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the daemon and listen for pings
    Run(RunArgs),

    /// Send a single ping to a running daemon
    Ping(PingArgs),

    /// Show the current liveness state of a running daemon
    Status(StatusArgs),

    /// Validate the configuration and list the sinks it registers
    Check(CheckArgs),

    /// Drive the state machine in the foreground with random pings
    Simulate(SimulateArgs),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_simulate_defaults() {
        let cli = Cli::try_parse_from(["deadman", "simulate"]).unwrap();
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.ping_probability, 0.2);
        assert_eq!(args.max_silence_secs, 30);
        assert_eq!(args.max_ticks, None);
    }

    #[test]
    fn test_rejects_out_of_range_probability() {
        assert!(Cli::try_parse_from(["deadman", "simulate", "--ping-probability", "1.5"]).is_err());
    }

    #[test]
    fn test_parse_status_json() {
        let cli =
            Cli::try_parse_from(["deadman", "status", "--address", "10.0.0.1:9000", "--json"])
                .unwrap();
        let Commands::Status(args) = cli.command else {
            panic!("expected status");
        };
        assert_eq!(args.address, "10.0.0.1:9000");
        assert!(args.json);
    }
}
