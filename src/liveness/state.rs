//! Liveness states and the pure transition policy between them

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of the monitored process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LivenessState {
    /// Pings are arriving within the timeout
    #[default]
    Alive,
    /// No ping for longer than the timeout
    Dead,
    /// A ping was seen while dead; lasts exactly one tick
    Resurrecting,
}

impl LivenessState {
    /// Decide the state that follows `self` given the time since the last ping.
    ///
    /// The comparison is strict: an elapsed time equal to the timeout is still
    /// on the healthy side.
    pub fn next(self, elapsed: Duration, timeout: Duration) -> LivenessState {
        let expired = elapsed > timeout;
        match self {
            Self::Alive if expired => Self::Dead,
            Self::Alive => Self::Alive,
            Self::Dead if expired => Self::Dead,
            Self::Dead => Self::Resurrecting,
            Self::Resurrecting => Self::Alive,
        }
    }

    /// Get label for state
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Dead => "dead",
            Self::Resurrecting => "resurrecting",
        }
    }

    /// Get emoji representation
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Alive => "✅",
            Self::Dead => "🔴",
            Self::Resurrecting => "🔄",
        }
    }
}

impl fmt::Display for LivenessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
