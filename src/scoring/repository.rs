use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{rank_totals, LeaderboardEntry, ResultModel, ScoreModel};
use crate::category::Category;
use crate::db::db_error;
use crate::race::repository::RaceRepository;
use crate::shared::AppError;

/// Trait for official result storage
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Inserts or overwrites the result of (race, category)
    async fn upsert_result(&self, result: &ResultModel) -> Result<(), AppError>;
    async fn get_result(&self, race_id: i64, category: Category) -> Result<Option<ResultModel>, AppError>;
}

/// Trait for computed score storage and leaderboard aggregation
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    async fn upsert_score(&self, score: &ScoreModel) -> Result<(), AppError>;
    /// Scores of one race category, highest first
    async fn list_race_category_scores(
        &self,
        race_id: i64,
        category: Category,
    ) -> Result<Vec<ScoreModel>, AppError>;
    async fn season_leaderboard(&self, season: i32) -> Result<Vec<LeaderboardEntry>, AppError>;
    async fn race_leaderboard(&self, race_id: i64) -> Result<Vec<LeaderboardEntry>, AppError>;
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::DatabaseError(e.to_string()))
}

fn decode_category(raw: &str) -> Result<Category, AppError> {
    raw.parse()
        .map_err(|_| AppError::DatabaseError(format!("Unknown stored category `{raw}`")))
}

/// In-memory implementation of ResultRepository for development and testing
pub struct InMemoryResultRepository {
    results: RwLock<HashMap<(i64, Category), ResultModel>>,
}

impl Default for InMemoryResultRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn upsert_result(&self, result: &ResultModel) -> Result<(), AppError> {
        self.results
            .write()
            .await
            .insert((result.race_id, result.category), result.clone());
        Ok(())
    }

    async fn get_result(&self, race_id: i64, category: Category) -> Result<Option<ResultModel>, AppError> {
        Ok(self.results.read().await.get(&(race_id, category)).cloned())
    }
}

/// In-memory implementation of ScoreRepository; needs races to resolve seasons
pub struct InMemoryScoreRepository {
    scores: RwLock<HashMap<(String, i64, Category), ScoreModel>>,
    races: Arc<dyn RaceRepository>,
}

impl InMemoryScoreRepository {
    pub fn new(races: Arc<dyn RaceRepository>) -> Self {
        Self {
            scores: RwLock::new(HashMap::new()),
            races,
        }
    }

    fn aggregate<'a>(scores: impl Iterator<Item = &'a ScoreModel>) -> Vec<LeaderboardEntry> {
        let mut totals: BTreeMap<&str, (String, i64)> = BTreeMap::new();
        for score in scores {
            let entry = totals
                .entry(score.user_id.as_str())
                .or_insert_with(|| (score.username.clone(), 0));
            if score.username > entry.0 {
                entry.0 = score.username.clone();
            }
            entry.1 += i64::from(score.points);
        }

        rank_totals(
            totals
                .into_iter()
                .map(|(user_id, (username, total))| (user_id.to_string(), username, total))
                .collect(),
        )
    }
}

#[async_trait]
impl ScoreRepository for InMemoryScoreRepository {
    async fn upsert_score(&self, score: &ScoreModel) -> Result<(), AppError> {
        let key = (score.user_id.clone(), score.race_id, score.category);
        self.scores.write().await.insert(key, score.clone());
        Ok(())
    }

    async fn list_race_category_scores(
        &self,
        race_id: i64,
        category: Category,
    ) -> Result<Vec<ScoreModel>, AppError> {
        let scores = self.scores.read().await;
        let mut found: Vec<ScoreModel> = scores
            .values()
            .filter(|score| score.race_id == race_id && score.category == category)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user_id.cmp(&b.user_id)));
        Ok(found)
    }

    async fn season_leaderboard(&self, season: i32) -> Result<Vec<LeaderboardEntry>, AppError> {
        let race_ids: Vec<i64> = self
            .races
            .list_season(season)
            .await?
            .iter()
            .map(|race| race.id)
            .collect();

        let scores = self.scores.read().await;
        Ok(Self::aggregate(
            scores.values().filter(|score| race_ids.contains(&score.race_id)),
        ))
    }

    async fn race_leaderboard(&self, race_id: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let scores = self.scores.read().await;
        Ok(Self::aggregate(
            scores.values().filter(|score| score.race_id == race_id),
        ))
    }
}

/// SQLite implementation of ResultRepository
pub struct SqliteResultRepository {
    pool: SqlitePool,
}

impl SqliteResultRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultRepository for SqliteResultRepository {
    #[instrument(skip(self, result), fields(race_id = result.race_id, category = %result.category))]
    async fn upsert_result(&self, result: &ResultModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO race_results (race_id, category, results) VALUES (?, ?, ?)
             ON CONFLICT(race_id, category) DO UPDATE SET results = excluded.results",
        )
        .bind(result.race_id)
        .bind(result.category.as_ref())
        .bind(encode_json(&result.results)?)
        .execute(&self.pool)
        .await
        .map_err(db_error("upsert result"))?;

        debug!("Result upserted");
        Ok(())
    }

    async fn get_result(&self, race_id: i64, category: Category) -> Result<Option<ResultModel>, AppError> {
        let row = sqlx::query("SELECT results FROM race_results WHERE race_id = ? AND category = ?")
            .bind(race_id)
            .bind(category.as_ref())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("get result"))?;

        row.map(|row| {
            let raw: String = row.get("results");
            let results = serde_json::from_str(&raw)
                .map_err(|e| AppError::DatabaseError(format!("Corrupt stored result: {e}")))?;
            Ok(ResultModel {
                race_id,
                category,
                results,
            })
        })
        .transpose()
    }
}

/// SQLite implementation of ScoreRepository
pub struct SqliteScoreRepository {
    pool: SqlitePool,
}

impl SqliteScoreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn score_from_row(row: &SqliteRow) -> Result<ScoreModel, AppError> {
    let category: String = row.get("category");
    let detail: String = row.get("detail");

    Ok(ScoreModel {
        user_id: row.get("user_id"),
        username: row.get("username"),
        race_id: row.get("race_id"),
        category: decode_category(&category)?,
        points: row.get("points"),
        detail: serde_json::from_str(&detail)
            .map_err(|e| AppError::DatabaseError(format!("Corrupt stored score detail: {e}")))?,
    })
}

fn leaderboard_from_rows(rows: &[SqliteRow]) -> Vec<LeaderboardEntry> {
    rank_totals(
        rows.iter()
            .map(|row| {
                (
                    row.get::<String, _>("user_id"),
                    row.get::<String, _>("username"),
                    row.get::<i64, _>("total_points"),
                )
            })
            .collect(),
    )
}

#[async_trait]
impl ScoreRepository for SqliteScoreRepository {
    #[instrument(skip(self, score), fields(user_id = %score.user_id, race_id = score.race_id, category = %score.category))]
    async fn upsert_score(&self, score: &ScoreModel) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO scores (user_id, username, race_id, category, points, detail)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, race_id, category) DO UPDATE SET
                username = excluded.username,
                points = excluded.points,
                detail = excluded.detail",
        )
        .bind(&score.user_id)
        .bind(&score.username)
        .bind(score.race_id)
        .bind(score.category.as_ref())
        .bind(score.points)
        .bind(encode_json(&score.detail)?)
        .execute(&self.pool)
        .await
        .map_err(db_error("upsert score"))?;

        Ok(())
    }

    async fn list_race_category_scores(
        &self,
        race_id: i64,
        category: Category,
    ) -> Result<Vec<ScoreModel>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, username, race_id, category, points, detail FROM scores
             WHERE race_id = ? AND category = ?
             ORDER BY points DESC, user_id ASC",
        )
        .bind(race_id)
        .bind(category.as_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list category scores"))?;

        rows.iter().map(score_from_row).collect()
    }

    async fn season_leaderboard(&self, season: i32) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT s.user_id AS user_id, MAX(s.username) AS username, SUM(s.points) AS total_points
             FROM scores s JOIN races r ON r.id = s.race_id
             WHERE r.season = ?
             GROUP BY s.user_id",
        )
        .bind(season)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("season leaderboard"))?;

        Ok(leaderboard_from_rows(&rows))
    }

    async fn race_leaderboard(&self, race_id: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, MAX(username) AS username, SUM(points) AS total_points
             FROM scores WHERE race_id = ?
             GROUP BY user_id",
        )
        .bind(race_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("race leaderboard"))?;

        Ok(leaderboard_from_rows(&rows))
    }
}
