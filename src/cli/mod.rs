//! CLI command implementations

pub mod check;
pub mod definition;
pub mod ping;
pub mod run;
pub mod simulate;
pub mod status;

pub use definition::{Cli, Commands};

/// Render a millisecond count as a short human duration ("2m 05s", "850ms")
pub fn format_millis(ms: i64) -> String {
    if ms < 0 {
        return format!("-{}", format_millis(ms.saturating_neg()));
    }
    if ms < 1000 {
        return format!("{ms}ms");
    }

    let secs = ms / 1000;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}
