//! One evaluation tick of the deadman state machine
//!
//! Every state owns one notification duty, applied both while the context is
//! in that state and on the tick that enters it:
//! - Alive clears both episode flags
//! - Dead sends the alert unless this episode already sent it
//! - Resurrecting sends the resolve unless this episode already sent it
//!
//! A flag is only set when the dispatcher reports the notification as sent, so
//! a dispatch with no sinks is retried on every following tick of the episode.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::context::LivenessContext;
use super::state::LivenessState;
use crate::notify::{dispatch_alert, dispatch_resolve};

/// Evaluate `context` at `now`, transitioning and notifying as needed
pub fn evaluate(context: &mut LivenessContext, now: DateTime<Utc>) {
    let current = context.state;
    context.previous_state = Some(current);
    debug!(state = %current, "State is {}", current);

    fulfil_duty(context, current);

    let elapsed = context.elapsed(now);
    let next = current.next(elapsed, context.timeout);
    if next == current {
        return;
    }

    info!(
        from = %current,
        to = %next,
        elapsed_secs = elapsed.num_seconds(),
        "Liveness changed from {} to {}",
        current,
        next
    );
    context.state = next;
    fulfil_duty(context, next);
}

fn fulfil_duty(context: &mut LivenessContext, state: LivenessState) {
    match state {
        LivenessState::Alive => context.clear_notification_flags(),
        LivenessState::Dead => {
            if !context.alert_sent {
                context.alert_sent = dispatch_alert(&context.sinks);
            }
        }
        LivenessState::Resurrecting => {
            if !context.resolve_sent {
                context.resolve_sent = dispatch_resolve(&context.sinks);
            }
        }
    }
}
