//! Background token refresh

use crate::controller::WeakSessionController;
use mobank_core::config::RefreshConfig;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Periodically refresh the access token when it is about to expire.
///
/// The task only holds a weak handle, so it ends on its own once the last
/// controller is dropped; `cancel` stops it earlier.
pub(crate) fn spawn_refresh_task(
    session: WeakSessionController,
    config: RefreshConfig,
    cancel: CancellationToken,
) {
    let period = config.check_interval().max(MIN_CHECK_INTERVAL);

    tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(interval_secs = period.as_secs(), "Background token refresh started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let Some(controller) = session.upgrade() else {
                        break;
                    };
                    controller.refresh_if_expiring(config.threshold_minutes);
                }
            }
        }

        debug!("Background token refresh stopped");
    });
}
