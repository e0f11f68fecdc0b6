use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::interval;
use tracing::{debug, error, info, instrument};

use crate::notify::{embeds, Notifier};
use crate::race::{RaceService, Session};
use crate::shared::AppError;

/// Remembers which (race, session) reminders went out. Lives in memory only,
/// so a restart may repeat a reminder.
#[derive(Default)]
pub struct ReminderTracker {
    sent: Mutex<HashSet<(i64, Session)>>,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the reminder had not been sent yet
    pub async fn mark_sent(&self, race_id: i64, session: Session) -> bool {
        self.sent.lock().await.insert((race_id, session))
    }
}

#[instrument(skip(race_service, notifier, tracker))]
pub async fn start_reminder_task(
    race_service: Arc<RaceService>,
    notifier: Arc<dyn Notifier>,
    tracker: Arc<ReminderTracker>,
    period: Duration,
    lookahead: Duration,
) {
    info!(
        interval_secs = period.as_secs(),
        lookahead_secs = lookahead.as_secs(),
        "Starting reminder task"
    );

    let lookahead = chrono::Duration::from_std(lookahead).unwrap_or(chrono::Duration::hours(1));
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;

        match run_reminder_pass(&race_service, notifier.as_ref(), &tracker, Utc::now(), lookahead).await {
            Ok(0) => {}
            Ok(sent) => info!(sent, "Reminders sent"),
            Err(e) => error!(error = %e, "Reminder pass failed"),
        }
    }
}

/// Sends one reminder per open session starting within the lookahead window
pub async fn run_reminder_pass(
    race_service: &RaceService,
    notifier: &dyn Notifier,
    tracker: &ReminderTracker,
    now: DateTime<Utc>,
    lookahead: chrono::Duration,
) -> Result<usize, AppError> {
    let mut sent = 0;

    for race in race_service.list_season().await? {
        for session in race.sessions() {
            let Some(start) = race.session_start(session) else {
                continue;
            };
            if race.is_locked(session) || start <= now || start > now + lookahead {
                continue;
            }
            if !tracker.mark_sent(race.id, session).await {
                continue;
            }

            debug!(race_id = race.id, session = %session, "Sending session reminder");
            notifier
                .broadcast(&embeds::session_reminder(&race, session, start))
                .await;
            sent += 1;
        }
    }

    Ok(sent)
}
