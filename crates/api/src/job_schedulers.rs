use crate::{
    certification::send_bulk_reminders::SendBulkRemindersUseCase, shared::usecase::execute,
};
use actix_web::rt::time::{interval, sleep_until, Instant};
use certwatch_infra::CertwatchContext;
use std::time::Duration;
use tracing::{info, warn};

/// Seconds until the next multiple of `interval_secs` since the epoch
pub fn get_start_delay(now_ts: i64, interval_secs: u64) -> u64 {
    let now_secs = (now_ts / 1000).max(0) as u64;
    interval_secs - now_secs % interval_secs
}

/// Sweeps all tenants for due reminders on the configured interval.
/// Does nothing when no interval is configured.
pub fn start_reminder_sweep_job(ctx: CertwatchContext) {
    let interval_secs = match ctx.config.reminder_sweep_interval_secs {
        Some(0) => {
            warn!("REMINDER_SWEEP_INTERVAL_SECS must be positive, the reminder sweep job is disabled");
            return;
        }
        Some(secs) => secs,
        None => return,
    };
    info!("Sweeping due reminders every {} seconds", interval_secs);

    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now, interval_secs);
        sleep_until(Instant::now() + Duration::from_secs(secs_to_next_run)).await;

        let mut sweep_interval = interval(Duration::from_secs(interval_secs));
        loop {
            sweep_interval.tick().await;
            let usecase = SendBulkRemindersUseCase { tenant_id: None };
            let _ = execute(usecase, &ctx).await;
        }
    });
}
