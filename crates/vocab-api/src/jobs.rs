//! Background tasks that keep hosted sessions moving and bounded.

use std::time::Duration;

use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle, time::interval};

use crate::study::{SessionRegistry, TimerFired};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Start the timer dispatcher and the idle sweeper.
///
/// Returns the join handles so they can be aborted on shutdown.
pub fn start_background_jobs(
    registry: SessionRegistry,
    timers: UnboundedReceiver<TimerFired>,
    idle_timeout: Duration,
) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(dispatch_timers(registry.clone(), timers)),
        tokio::spawn(sweep_idle_sessions(registry, idle_timeout)),
    ]
}

/// Hand every fired timer back to the session that scheduled it.
pub async fn dispatch_timers(registry: SessionRegistry, mut timers: UnboundedReceiver<TimerFired>) {
    while let Some(fired) = timers.recv().await {
        registry.fire(fired);
    }
    tracing::debug!("timer channel closed, dispatcher stopping");
}

/// Tear down sessions nobody has touched for `idle_timeout`.
async fn sweep_idle_sessions(registry: SessionRegistry, idle_timeout: Duration) {
    let mut interval = interval(SWEEP_INTERVAL.min(idle_timeout).max(Duration::from_secs(1)));

    loop {
        interval.tick().await;

        match registry.sweep_idle(idle_timeout) {
            0 => tracing::trace!("no idle sessions"),
            swept => tracing::info!(swept, remaining = registry.len(), "swept idle sessions"),
        }
    }
}
