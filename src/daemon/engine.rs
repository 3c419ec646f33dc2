//! Evaluation thread owning the liveness context
//!
//! The context never leaves this thread. Pings and status requests arrive as
//! messages and are handled between ticks, so ping ingestion and evaluation
//! never overlap. Sinks are built on this thread too, which keeps blocking
//! transports (the webhook sink's HTTP client) off the async runtime.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::liveness::{LivenessContext, LivenessSnapshot, LivenessState};
use crate::notify::NotificationSink;

pub enum EngineCommand {
    Ping { at: DateTime<Utc> },
    Status { reply: oneshot::Sender<LivenessSnapshot> },
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub initial_state: LivenessState,
    pub timeout: chrono::Duration,
    pub tick_interval: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            initial_state: config.initial_state,
            timeout: config.timeout(),
            tick_interval: config.tick_interval(),
        }
    }
}

/// Cloneable handle for talking to a running engine
#[derive(Debug, Clone)]
pub struct EngineSender {
    tx: mpsc::Sender<EngineCommand>,
}

impl EngineSender {
    /// Record a ping received now
    pub fn ping(&self) -> Result<()> {
        self.ping_at(Utc::now())
    }

    pub fn ping_at(&self, at: DateTime<Utc>) -> Result<()> {
        self.send(EngineCommand::Ping { at })
    }

    pub async fn status(&self) -> Result<LivenessSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::Status { reply })?;
        rx.await
            .context("Liveness engine stopped before answering the status request")
    }

    fn send(&self, command: EngineCommand) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| anyhow!("Liveness engine is not running"))
    }
}

pub struct Engine {
    sender: EngineSender,
    thread: JoinHandle<()>,
}

impl Engine {
    /// Start the evaluation thread. `make_sinks` runs on that thread.
    pub fn spawn<F>(settings: EngineSettings, make_sinks: F) -> Result<Self>
    where
        F: FnOnce() -> Vec<Box<dyn NotificationSink>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("deadman-engine".to_string())
            .spawn(move || run_loop(settings, make_sinks(), rx))
            .context("Failed to spawn liveness engine thread")?;

        Ok(Self {
            sender: EngineSender { tx },
            thread,
        })
    }

    pub fn sender(&self) -> EngineSender {
        self.sender.clone()
    }

    /// Stop the evaluation thread and wait for it. Blocks.
    pub fn shutdown(self) -> Result<()> {
        // The thread may already be gone; joining reports that below.
        let _ = self.sender.tx.send(EngineCommand::Shutdown);
        self.thread
            .join()
            .map_err(|_| anyhow!("Liveness engine thread panicked"))
    }
}

fn run_loop(
    settings: EngineSettings,
    sinks: Vec<Box<dyn NotificationSink>>,
    rx: mpsc::Receiver<EngineCommand>,
) {
    let mut context = LivenessContext::new(settings.initial_state, settings.timeout, sinks);
    info!(
        state = %context.state(),
        timeout_secs = settings.timeout.num_seconds(),
        sinks = ?context.sink_names(),
        "Liveness engine started"
    );
    if context.sinks().is_empty() {
        warn!("No sinks configured; alerts and resolves cannot be delivered");
    }

    let mut next_tick = Instant::now();
    loop {
        let now = Instant::now();
        if now >= next_tick {
            context.evaluate(Utc::now());
            next_tick = reschedule(next_tick, Instant::now(), settings.tick_interval);
            continue;
        }

        match rx.recv_timeout(next_tick - now) {
            Ok(EngineCommand::Ping { at }) => {
                debug!("Ping");
                context.record_ping(at);
            }
            Ok(EngineCommand::Status { reply }) => {
                // The requester may have given up waiting
                let _ = reply.send(context.snapshot(Utc::now()));
            }
            Ok(EngineCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    info!(state = %context.state(), "Liveness engine stopped");
}

/// Next tick after the one due at `due`. Ticks missed while an evaluation
/// ran long are dropped: the schedule restarts one interval after `now`.
fn reschedule(due: Instant, now: Instant, interval: Duration) -> Instant {
    let next = due + interval;
    if next <= now {
        now + interval
    } else {
        next
    }
}
