use std::sync::Arc;

use time::{Duration, OffsetDateTime, Time, UtcOffset};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ResetConfig;
use crate::ledger::{services, store::LedgerStore};

/// First `hour:minute` UTC strictly after `now`.
pub fn next_run_after(now: OffsetDateTime, hour: u8, minute: u8) -> anyhow::Result<OffsetDateTime> {
    let now = now.to_offset(UtcOffset::UTC);
    let today = now.replace_time(Time::from_hms(hour, minute, 0)?);
    Ok(if today > now {
        today
    } else {
        today + Duration::days(1)
    })
}

/// Runs the reset only once `now` has reached `next`. A timer that fires
/// early (clock step, coarse sleep) reports `false` and the loop re-arms.
async fn reset_if_due(
    store: &dyn LedgerStore,
    batch_size: usize,
    now: OffsetDateTime,
    next: OffsetDateTime,
) -> bool {
    if now < next {
        debug!(%now, %next, "reset timer fired early");
        return false;
    }
    if let Err(e) = services::reset_all(store, batch_size).await {
        error!(error = %e, "daily ledger reset failed");
    }
    true
}

/// Zeroes every ledger's totals once a day until `token` is cancelled.
///
/// A failed run is logged and left for the next day's trigger.
pub async fn run_daily_reset(store: Arc<dyn LedgerStore>, cfg: ResetConfig, token: CancellationToken) {
    info!(hour = cfg.hour_utc, minute = cfg.minute_utc, "daily ledger reset scheduled");
    loop {
        let now = OffsetDateTime::now_utc();
        let next = match next_run_after(now, cfg.hour_utc, cfg.minute_utc) {
            Ok(t) => t,
            Err(e) => {
                error!(error = %e, "invalid reset time; scheduler not running");
                return;
            }
        };
        debug!(%next, "next ledger reset");

        tokio::select! {
            _ = token.cancelled() => {
                info!("reset scheduler stopped");
                return;
            }
            _ = tokio::time::sleep((next - now).unsigned_abs()) => {}
        }

        reset_if_due(store.as_ref(), cfg.batch_size, OffsetDateTime::now_utc(), next).await;
    }
}
