//! `deadman status` command implementation

use anyhow::Result;
use clap::Args;

use super::format_millis;
use crate::config::DEFAULT_LISTEN_ADDRESS;
use crate::daemon::client;
use crate::liveness::LivenessSnapshot;

#[derive(Args)]
pub struct StatusArgs {
    /// Address of the running daemon
    #[arg(long, env = "DEADMAN_SWITCH_ADDRESS", default_value = DEFAULT_LISTEN_ADDRESS)]
    pub address: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: StatusArgs) -> Result<()> {
    let snapshot = client::status(&args.address).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render(&snapshot));
    }
    Ok(())
}

fn render(snapshot: &LivenessSnapshot) -> String {
    let mut out = format!(
        "{} {}\n",
        snapshot.state.emoji(),
        snapshot.state.label().to_uppercase()
    );

    if let Some(previous) = snapshot.previous_state {
        out.push_str(&format!("  previous:   {}\n", previous));
    }
    out.push_str(&format!(
        "  last ping:  {} ({} ago)\n",
        snapshot.last_ping_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_millis(snapshot.elapsed_ms)
    ));

    let remaining = snapshot.remaining_ms();
    if remaining > 0 {
        out.push_str(&format!(
            "  timeout:    {} ({} left)\n",
            format_millis(snapshot.timeout_ms),
            format_millis(remaining)
        ));
    } else {
        out.push_str(&format!(
            "  timeout:    {} (exceeded)\n",
            format_millis(snapshot.timeout_ms)
        ));
    }

    out.push_str(&format!(
        "  alert sent: {}  resolve sent: {}\n",
        yes_no(snapshot.alert_sent),
        yes_no(snapshot.resolve_sent)
    ));

    if snapshot.sinks.is_empty() {
        out.push_str("  sinks:      (none)\n");
    } else {
        out.push_str(&format!("  sinks:      {}\n", snapshot.sinks.join(", ")));
    }
    out
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
