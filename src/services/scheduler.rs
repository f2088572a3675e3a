use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, FixedOffset, NaiveTime, TimeZone, Utc};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::services::conversion::run_conversion;

/// Next occurrence of `at` (in `offset` local time) strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, at: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let local_now = now.with_timezone(&offset);
    let today = local_now.date_naive();

    let candidate = today.and_time(at);
    let next = if candidate > local_now.naive_local() {
        candidate
    } else {
        today
            .checked_add_days(Days::new(1))
            .unwrap_or(today)
            .and_time(at)
    };

    offset
        .from_local_datetime(&next)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now + chrono::Duration::days(1))
}

/// Runs the conversion every day at the configured local time. A failed run
/// is logged and the next one is still scheduled.
pub fn start_scheduler(config: Arc<Config>) -> JoinHandle<()> {
    tracing::info!(
        "Scheduler started: catalog conversion will run daily at {} (UTC{})",
        config.schedule_time.format("%H:%M"),
        config.source.utc_offset
    );

    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = next_run_after(now, config.schedule_time, config.source.utc_offset);
            let wait = (next - now).to_std().unwrap_or(Duration::from_secs(1));
            tracing::debug!("Next scheduled conversion at {}", next);
            tokio::time::sleep(wait).await;

            tracing::info!("Running scheduled task: catalog conversion");
            match run_conversion(&config, None).await {
                Ok(summary) => tracing::info!(
                    "Scheduled conversion finished: {} converted, {} failed",
                    summary.converted.len(),
                    summary.failed.len()
                ),
                Err(e) => tracing::error!("Error during conversion process: {}", e),
            }
        }
    })
}
