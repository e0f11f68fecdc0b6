use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{RaceModel, Session};
use crate::db::db_error;
use crate::provider::RaceInfo;
use crate::shared::AppError;

const RACE_COLUMNS: &str = "id, season, round, name, circuit, country, quali_date, sprint_date, \
     race_date, quali_locked, sprint_locked, race_locked";

/// Trait for race repository operations
#[async_trait]
pub trait RaceRepository: Send + Sync {
    /// Inserts or refreshes a race keyed by (season, round); lock flags are left untouched
    async fn upsert_race(&self, info: &RaceInfo) -> Result<RaceModel, AppError>;
    async fn get_race(&self, race_id: i64) -> Result<Option<RaceModel>, AppError>;
    async fn get_race_by_round(&self, season: i32, round: i32) -> Result<Option<RaceModel>, AppError>;
    /// All races of a season ordered by round
    async fn list_season(&self, season: i32) -> Result<Vec<RaceModel>, AppError>;
    async fn set_lock(&self, race_id: i64, session: Session, locked: bool) -> Result<(), AppError>;
}

struct RaceStore {
    races: BTreeMap<i64, RaceModel>,
    next_id: i64,
}

/// In-memory implementation of RaceRepository for development and testing
pub struct InMemoryRaceRepository {
    store: RwLock<RaceStore>,
}

impl Default for InMemoryRaceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRaceRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(RaceStore {
                races: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl RaceRepository for InMemoryRaceRepository {
    #[instrument(skip(self, info), fields(season = info.season, round = info.round))]
    async fn upsert_race(&self, info: &RaceInfo) -> Result<RaceModel, AppError> {
        let mut store = self.store.write().await;

        let existing = store
            .races
            .values_mut()
            .find(|race| race.season == info.season && race.round == info.round);

        if let Some(race) = existing {
            race.name = info.name.clone();
            race.circuit = info.circuit.clone();
            race.country = info.country.clone();
            race.quali_date = info.quali_date;
            race.sprint_date = info.sprint_date;
            race.race_date = info.race_date;
            debug!(race_id = race.id, "Race refreshed in memory");
            return Ok(race.clone());
        }

        let id = store.next_id;
        store.next_id += 1;

        let race = RaceModel {
            id,
            season: info.season,
            round: info.round,
            name: info.name.clone(),
            circuit: info.circuit.clone(),
            country: info.country.clone(),
            quali_date: info.quali_date,
            sprint_date: info.sprint_date,
            race_date: info.race_date,
            quali_locked: false,
            sprint_locked: false,
            race_locked: false,
        };
        store.races.insert(id, race.clone());

        debug!(race_id = id, "Race created in memory");
        Ok(race)
    }

    async fn get_race(&self, race_id: i64) -> Result<Option<RaceModel>, AppError> {
        Ok(self.store.read().await.races.get(&race_id).cloned())
    }

    async fn get_race_by_round(&self, season: i32, round: i32) -> Result<Option<RaceModel>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .races
            .values()
            .find(|race| race.season == season && race.round == round)
            .cloned())
    }

    async fn list_season(&self, season: i32) -> Result<Vec<RaceModel>, AppError> {
        let store = self.store.read().await;
        let mut races: Vec<RaceModel> = store
            .races
            .values()
            .filter(|race| race.season == season)
            .cloned()
            .collect();
        races.sort_by_key(|race| race.round);
        Ok(races)
    }

    #[instrument(skip(self))]
    async fn set_lock(&self, race_id: i64, session: Session, locked: bool) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        match store.races.get_mut(&race_id) {
            Some(race) => {
                race.set_locked(session, locked);
                Ok(())
            }
            None => {
                warn!(race_id, "Cannot change lock of unknown race");
                Err(AppError::NotFound(format!("Race {race_id} not found")))
            }
        }
    }
}

/// SQLite implementation of RaceRepository
pub struct SqliteRaceRepository {
    pool: SqlitePool,
}

impl SqliteRaceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn lock_column(session: Session) -> &'static str {
    match session {
        Session::Quali => "quali_locked",
        Session::Sprint => "sprint_locked",
        Session::Race => "race_locked",
    }
}

#[async_trait]
impl RaceRepository for SqliteRaceRepository {
    #[instrument(skip(self, info), fields(season = info.season, round = info.round))]
    async fn upsert_race(&self, info: &RaceInfo) -> Result<RaceModel, AppError> {
        let query = format!(
            "INSERT INTO races (season, round, name, circuit, country, quali_date, sprint_date, race_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(season, round) DO UPDATE SET
                name = excluded.name,
                circuit = excluded.circuit,
                country = excluded.country,
                quali_date = excluded.quali_date,
                sprint_date = excluded.sprint_date,
                race_date = excluded.race_date
             RETURNING {RACE_COLUMNS}"
        );

        let race = sqlx::query_as::<_, RaceModel>(&query)
            .bind(info.season)
            .bind(info.round)
            .bind(&info.name)
            .bind(&info.circuit)
            .bind(&info.country)
            .bind(info.quali_date)
            .bind(info.sprint_date)
            .bind(info.race_date)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("upsert race"))?;

        debug!(race_id = race.id, "Race upserted");
        Ok(race)
    }

    async fn get_race(&self, race_id: i64) -> Result<Option<RaceModel>, AppError> {
        sqlx::query_as::<_, RaceModel>(&format!("SELECT {RACE_COLUMNS} FROM races WHERE id = ?"))
            .bind(race_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get race"))
    }

    async fn get_race_by_round(&self, season: i32, round: i32) -> Result<Option<RaceModel>, AppError> {
        sqlx::query_as::<_, RaceModel>(&format!(
            "SELECT {RACE_COLUMNS} FROM races WHERE season = ? AND round = ?"
        ))
        .bind(season)
        .bind(round)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get race by round"))
    }

    async fn list_season(&self, season: i32) -> Result<Vec<RaceModel>, AppError> {
        sqlx::query_as::<_, RaceModel>(&format!(
            "SELECT {RACE_COLUMNS} FROM races WHERE season = ? ORDER BY round"
        ))
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list season races"))
    }

    #[instrument(skip(self))]
    async fn set_lock(&self, race_id: i64, session: Session, locked: bool) -> Result<(), AppError> {
        let query = format!("UPDATE races SET {} = ? WHERE id = ?", lock_column(session));
        let result = sqlx::query(&query)
            .bind(locked)
            .bind(race_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("set race lock"))?;

        if result.rows_affected() == 0 {
            warn!(race_id, "Cannot change lock of unknown race");
            return Err(AppError::NotFound(format!("Race {race_id} not found")));
        }
        Ok(())
    }
}
