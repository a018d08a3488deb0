use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::hub::HubHandle;

/// Requests a liveness sweep every `period`, starting one period from now.
///
/// Dead connections surface when their servicer fails to write the probe.
/// Returns once the hub loop has stopped.
pub async fn run_sweeper(hub: HubHandle, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if hub.sweep().await.is_err() {
            debug!("Hub stopped, sweeper exiting");
            return;
        }
    }
}
