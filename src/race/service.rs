use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::models::{RaceModel, Session};
use super::repository::RaceRepository;
use crate::provider::ResultsProvider;
use crate::shared::AppError;

const PAST_RACES_SHOWN: usize = 2;
const UPCOMING_RACES_SHOWN: usize = 5;

/// A session that was closed to betting by the lock pass
#[derive(Debug, Clone, PartialEq)]
pub struct LockTransition {
    pub race_id: i64,
    pub round: i32,
    pub race_name: String,
    pub session: Session,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarWindow {
    pub past: Vec<RaceModel>,
    pub upcoming: Vec<RaceModel>,
}

/// Race calendar and session lifecycle for the active season
pub struct RaceService {
    repository: Arc<dyn RaceRepository>,
    provider: Arc<dyn ResultsProvider>,
    season: i32,
}

impl RaceService {
    pub fn new(
        repository: Arc<dyn RaceRepository>,
        provider: Arc<dyn ResultsProvider>,
        season: i32,
    ) -> Self {
        Self {
            repository,
            provider,
            season,
        }
    }

    pub fn season(&self) -> i32 {
        self.season
    }

    /// Pulls the season calendar from the provider and upserts every race
    #[instrument(skip(self), fields(season = self.season))]
    pub async fn sync_calendar(&self) -> Result<usize, AppError> {
        let calendar = self
            .provider
            .fetch_season_calendar(self.season)
            .await
            .map_err(|e| {
                warn!(error = %e, "Calendar fetch failed");
                AppError::Upstream(e.to_string())
            })?;

        for info in &calendar {
            self.repository.upsert_race(info).await?;
        }

        info!(races = calendar.len(), "Season calendar synchronized");
        Ok(calendar.len())
    }

    pub async fn list_season(&self) -> Result<Vec<RaceModel>, AppError> {
        self.repository.list_season(self.season).await
    }

    pub async fn get_race(&self, race_id: i64) -> Result<RaceModel, AppError> {
        self.repository
            .get_race(race_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Race {race_id} not found")))
    }

    pub async fn get_by_round(&self, round: i32) -> Result<RaceModel, AppError> {
        self.repository
            .get_race_by_round(self.season, round)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Round {round} of the {} season not found", self.season))
            })
    }

    /// Locks every session whose start time has been reached
    #[instrument(skip(self))]
    pub async fn lock_due_sessions(&self, now: DateTime<Utc>) -> Result<Vec<LockTransition>, AppError> {
        let mut transitions = Vec::new();

        for race in self.repository.list_season(self.season).await? {
            for session in race.sessions_due_for_lock(now) {
                self.repository.set_lock(race.id, session, true).await?;
                info!(
                    race_id = race.id,
                    round = race.round,
                    session = %session,
                    "Session locked at start time"
                );
                transitions.push(LockTransition {
                    race_id: race.id,
                    round: race.round,
                    race_name: race.name.clone(),
                    session,
                });
            }
        }

        Ok(transitions)
    }

    /// Admin override of a session lock flag
    #[instrument(skip(self))]
    pub async fn set_session_lock(
        &self,
        round: i32,
        session: Session,
        locked: bool,
    ) -> Result<RaceModel, AppError> {
        let mut race = self.get_by_round(round).await?;

        if session == Session::Sprint && !race.has_sprint() {
            return Err(AppError::Validation(format!(
                "{} has no sprint session",
                race.name
            )));
        }

        self.repository.set_lock(race.id, session, locked).await?;
        race.set_locked(session, locked);

        info!(race_id = race.id, round, session = %session, locked, "Session lock changed by admin");
        Ok(race)
    }

    /// Closes a session if still open; used when results are recorded
    pub async fn lock_session(&self, race: &RaceModel, session: Session) -> Result<(), AppError> {
        if race.is_locked(session) {
            return Ok(());
        }
        self.repository.set_lock(race.id, session, true).await?;
        info!(race_id = race.id, session = %session, "Session locked on results");
        Ok(())
    }

    /// First race of the season that still accepts race picks
    pub async fn next_race(&self) -> Result<Option<RaceModel>, AppError> {
        let mut races = self.repository.list_season(self.season).await?;
        races.sort_by_key(|race| race.race_date);
        Ok(races.into_iter().find(|race| !race.race_locked))
    }

    /// Resolves an explicit round, or the next open race when none is given
    pub async fn resolve_round(&self, round: Option<i32>) -> Result<RaceModel, AppError> {
        match round {
            Some(round) => self.get_by_round(round).await,
            None => self
                .next_race()
                .await?
                .ok_or_else(|| AppError::NotFound("No upcoming race this season".to_string())),
        }
    }

    /// The last two races already run and the next five to come
    pub async fn calendar_window(&self, now: DateTime<Utc>) -> Result<CalendarWindow, AppError> {
        let mut races = self.repository.list_season(self.season).await?;
        races.sort_by_key(|race| race.race_date);

        let (past, upcoming): (Vec<RaceModel>, Vec<RaceModel>) =
            races.into_iter().partition(|race| race.race_date < now);

        let skip = past.len().saturating_sub(PAST_RACES_SHOWN);
        Ok(CalendarWindow {
            past: past.into_iter().skip(skip).collect(),
            upcoming: upcoming.into_iter().take(UPCOMING_RACES_SHOWN).collect(),
        })
    }
}
