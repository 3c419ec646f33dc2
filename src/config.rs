//! Daemon configuration management

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::liveness::LivenessState;
use crate::notify::command::DEFAULT_COMMAND_TIMEOUT_SECS;
use crate::notify::http::{parse_target, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::notify::log::DEFAULT_LOG_SINK_NAME;
use crate::notify::{CommandSink, HttpPostJsonSink, LogSink, NotificationSink};

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:7878";

/// Upper bound on the liveness timeout (one year)
pub const MAX_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default)]
    pub initial_state: LivenessState,

    #[serde(default)]
    pub listener: ListenerConfig,

    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            initial_state: LivenessState::default(),
            listener: ListenerConfig::default(),
            sinks: Vec::new(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListenerConfig {
    #[serde(default = "default_listen_address")]
    pub address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> String {
    DEFAULT_LISTEN_ADDRESS.to_string()
}

/// One notification sink, selected by its `type` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SinkConfig {
    Http(HttpSinkConfig),
    Log(LogSinkConfig),
    Command(CommandSinkConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSinkConfig {
    /// Defaults to the URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub url: String,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub alert_payload: Map<String, Value>,

    #[serde(default)]
    pub resolve_payload: Map<String, Value>,

    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogSinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSinkConfig {
    /// Defaults to the program
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_command_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl SinkConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Log(_) => "log",
            Self::Command(_) => "command",
        }
    }

    /// Name the built sink will report in logs
    pub fn display_name(&self) -> String {
        match self {
            Self::Http(c) => c.name.clone().unwrap_or_else(|| c.url.clone()),
            Self::Log(c) => c
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_SINK_NAME.to_string()),
            Self::Command(c) => c.name.clone().unwrap_or_else(|| c.program.clone()),
        }
    }

    /// Describe a configuration problem that would leave the built sink
    /// failing every delivery, without constructing it
    pub fn problem(&self) -> Option<String> {
        match self {
            Self::Http(c) => parse_target(&c.url)
                .err()
                .or_else(|| timeout_problem(c.timeout_secs)),
            Self::Log(_) => None,
            Self::Command(c) if c.program.trim().is_empty() => {
                Some("program must not be empty".to_string())
            }
            Self::Command(c) => timeout_problem(c.timeout_secs),
        }
    }

    /// Construct the sink. Never fails: a misconfigured HTTP sink is logged
    /// and fails each delivery instead.
    pub fn build(&self) -> Box<dyn NotificationSink> {
        let name = self.display_name();
        match self {
            Self::Http(c) => Box::new(
                HttpPostJsonSink::new(&c.url)
                    .with_name(name)
                    .with_headers(c.headers.clone())
                    .with_alert_payload(c.alert_payload.clone())
                    .with_resolve_payload(c.resolve_payload.clone())
                    .with_timeout(Duration::from_secs(c.timeout_secs)),
            ),
            Self::Log(_) => Box::new(LogSink::new(name)),
            Self::Command(c) => Box::new(
                CommandSink::new(c.program.clone())
                    .with_name(name)
                    .with_args(c.args.clone())
                    .with_timeout(Duration::from_secs(c.timeout_secs)),
            ),
        }
    }
}

fn timeout_problem(timeout_secs: u64) -> Option<String> {
    if timeout_secs == 0 {
        Some("timeout_secs must be greater than zero".to_string())
    } else if timeout_secs > MAX_TIMEOUT_SECS {
        Some(format!(
            "timeout_secs must be at most {} (got {})",
            MAX_TIMEOUT_SECS, timeout_secs
        ))
    } else {
        None
    }
}

/// Default location: `<config dir>/deadman-switch/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("deadman-switch").join("config.toml"))
}

impl Config {
    /// Load from an explicit path, or from the default location when present,
    /// or fall back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config as TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            bail!(
                "timeout_secs must be at most {} (got {})",
                MAX_TIMEOUT_SECS,
                self.timeout_secs
            );
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        if self.tick_interval_ms > MAX_TIMEOUT_SECS * 1000 {
            bail!(
                "tick_interval_ms must be at most {} (got {})",
                MAX_TIMEOUT_SECS * 1000,
                self.tick_interval_ms
            );
        }
        if self.listener.address.trim().is_empty() {
            bail!("listener.address must not be empty");
        }
        Ok(())
    }

    pub fn timeout(&self) -> chrono::Duration {
        let secs = i64::try_from(self.timeout_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Build every configured sink, in configuration order
    pub fn build_sinks(&self) -> Vec<Box<dyn NotificationSink>> {
        self.sinks.iter().map(SinkConfig::build).collect()
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
