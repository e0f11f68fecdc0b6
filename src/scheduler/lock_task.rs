use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use crate::race::RaceService;
use crate::shared::AppError;

/// Periodically closes sessions whose start time has been reached
#[instrument(skip(race_service))]
pub async fn start_lock_task(race_service: Arc<RaceService>, period: Duration) {
    info!(interval_secs = period.as_secs(), "Starting session lock task");

    let mut ticker = interval(period);
    loop {
        ticker.tick().await;

        match run_lock_pass(&race_service, Utc::now()).await {
            Ok(0) => {}
            Ok(locked) => info!(locked, "Lock pass closed sessions"),
            Err(e) => error!(error = %e, "Lock pass failed"),
        }
    }
}

pub async fn run_lock_pass(race_service: &RaceService, now: DateTime<Utc>) -> Result<usize, AppError> {
    Ok(race_service.lock_due_sessions(now).await?.len())
}
