//! deadman-switch library - liveness state machine and notification fan-out
//!
//! A monitored process pings the switch. When pings stop for longer than the
//! timeout every configured sink receives one alert, and once pings return
//! every sink receives one resolve.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod liveness;
pub mod notify;
pub mod simulate;
