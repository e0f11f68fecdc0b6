use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, instrument};

use super::service::WizardService;

/// Periodically drops pick sessions whose wait window has passed
#[instrument(skip(wizard_service))]
pub async fn start_cleanup_task(wizard_service: Arc<WizardService>, period: Duration) {
    info!(interval_secs = period.as_secs(), "Starting pick session cleanup task");

    let mut ticker = interval(period);
    loop {
        ticker.tick().await;

        let removed = wizard_service.sweep_expired(Utc::now()).await;
        if removed > 0 {
            info!(removed, "Pick session cleanup completed");
        }
    }
}
