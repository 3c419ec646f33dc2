//! Long-running deadman daemon
//!
//! Wires the liveness engine to a TCP listener:
//! - engine: evaluates the context on a fixed cadence on its own thread
//! - listener: turns `PING` lines into pings and answers `STATUS`
//! - client: helpers for the `ping` and `status` commands

pub mod client;
pub mod engine;
pub mod listener;
pub mod protocol;

pub use engine::{Engine, EngineSender, EngineSettings};

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;

/// Run until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let listener = TcpListener::bind(&config.listener.address)
        .await
        .with_context(|| format!("Failed to bind ping listener on {}", config.listener.address))?;

    let settings = EngineSettings::from_config(&config);
    let engine = Engine::spawn(settings, move || config.build_sinks())?;

    let result = tokio::select! {
        res = listener::serve(listener, engine.sender()) => res,
        res = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
            res.context("Failed to listen for Ctrl-C")
        }
    };

    tokio::task::spawn_blocking(move || engine.shutdown())
        .await
        .context("Liveness engine shutdown task failed")??;

    result
}
