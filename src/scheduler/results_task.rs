use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument, warn};

use crate::race::RaceService;
use crate::scoring::ResultsPipeline;
use crate::shared::AppError;

/// Periodically polls the provider for sessions that should have finished
#[instrument(skip(race_service, pipeline))]
pub async fn start_results_task(
    race_service: Arc<RaceService>,
    pipeline: Arc<ResultsPipeline>,
    period: Duration,
) {
    info!(interval_secs = period.as_secs(), "Starting results polling task");

    let mut ticker = interval(period);
    loop {
        ticker.tick().await;

        match run_results_pass(&race_service, &pipeline, Utc::now()).await {
            Ok(0) => {}
            Ok(recorded) => info!(recorded, "Results pass recorded categories"),
            Err(e) => error!(error = %e, "Results pass failed"),
        }
    }
}

/// Fetches every locked session whose estimated end has passed and which has
/// no result yet. Returns the number of categories recorded.
pub async fn run_results_pass(
    race_service: &RaceService,
    pipeline: &ResultsPipeline,
    now: DateTime<Utc>,
) -> Result<usize, AppError> {
    let mut recorded = 0;

    for race in race_service.list_season().await? {
        for session in race.sessions() {
            let Some(start) = race.session_start(session) else {
                continue;
            };
            if !race.is_locked(session) || start + session.estimated_duration() > now {
                continue;
            }
            if pipeline.has_session_results(&race, session).await? {
                continue;
            }

            match pipeline.fetch_and_score_session(&race, session, false).await {
                Ok(categories) => recorded += categories.len(),
                Err(e) => warn!(
                    race_id = race.id,
                    session = %session,
                    error = %e,
                    "Scoring session failed, will retry on next pass"
                ),
            }
        }
    }

    Ok(recorded)
}
