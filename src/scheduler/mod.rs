//! Periodic background jobs. Each timer runs independently; a failing pass is
//! logged and retried on the next tick.

mod lock_task;
mod reminder_task;
mod results_task;

pub use lock_task::{run_lock_pass, start_lock_task};
pub use reminder_task::{run_reminder_pass, start_reminder_task, ReminderTracker};
pub use results_task::{run_results_pass, start_results_task};

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::shared::AppState;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub lock_interval: Duration,
    pub results_interval: Duration,
    pub reminder_interval: Duration,
    pub reminder_lookahead: Duration,
}

impl From<&Config> for SchedulerConfig {
    fn from(config: &Config) -> Self {
        Self {
            lock_interval: config.lock_check_interval,
            results_interval: config.results_check_interval,
            reminder_interval: config.reminder_check_interval,
            reminder_lookahead: config.reminder_lookahead,
        }
    }
}

/// Spawns one background task per timer
pub fn spawn_all(state: &AppState, config: SchedulerConfig) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(start_lock_task(
            Arc::clone(&state.race_service),
            config.lock_interval,
        )),
        tokio::spawn(start_results_task(
            Arc::clone(&state.race_service),
            Arc::clone(&state.results_pipeline),
            config.results_interval,
        )),
        tokio::spawn(start_reminder_task(
            Arc::clone(&state.race_service),
            Arc::clone(&state.notifier),
            Arc::new(ReminderTracker::new()),
            config.reminder_interval,
            config.reminder_lookahead,
        )),
    ]
}
