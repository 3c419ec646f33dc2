//! Liveness tracking
//!
//! Derives the monitored process's state from the time since its last ping:
//! - Alive: pinged within the timeout
//! - Dead: silent for longer than the timeout (alerts once per episode)
//! - Resurrecting: pinged again after being dead (resolves, then back to Alive)

pub mod context;
pub mod machine;
pub mod state;

pub use context::{LivenessContext, LivenessSnapshot};
pub use machine::evaluate;
pub use state::LivenessState;
