use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::BetModel;
use crate::category::Category;
use crate::db::db_error;
use crate::shared::AppError;

/// Trait for bet repository operations
#[async_trait]
pub trait BetRepository: Send + Sync {
    /// Inserts the bet or replaces the stored predictions for the same (user, race, category)
    async fn upsert_bet(&self, bet: &BetModel) -> Result<(), AppError>;
    /// A user's bets for one race, in category order
    async fn list_user_bets(&self, user_id: &str, race_id: i64) -> Result<Vec<BetModel>, AppError>;
    async fn list_race_category_bets(
        &self,
        race_id: i64,
        category: Category,
    ) -> Result<Vec<BetModel>, AppError>;
}

type BetKey = (String, i64, Category);

/// In-memory implementation of BetRepository for development and testing
pub struct InMemoryBetRepository {
    bets: RwLock<HashMap<BetKey, BetModel>>,
}

impl Default for InMemoryBetRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBetRepository {
    pub fn new() -> Self {
        Self {
            bets: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl BetRepository for InMemoryBetRepository {
    #[instrument(skip(self, bet), fields(user_id = %bet.user_id, race_id = bet.race_id, category = %bet.category))]
    async fn upsert_bet(&self, bet: &BetModel) -> Result<(), AppError> {
        let key = (bet.user_id.clone(), bet.race_id, bet.category);
        self.bets.write().await.insert(key, bet.clone());
        debug!("Bet stored in memory");
        Ok(())
    }

    async fn list_user_bets(&self, user_id: &str, race_id: i64) -> Result<Vec<BetModel>, AppError> {
        let bets = self.bets.read().await;
        let mut found: Vec<BetModel> = bets
            .values()
            .filter(|bet| bet.user_id == user_id && bet.race_id == race_id)
            .cloned()
            .collect();
        found.sort_by_key(|bet| bet.category);
        Ok(found)
    }

    async fn list_race_category_bets(
        &self,
        race_id: i64,
        category: Category,
    ) -> Result<Vec<BetModel>, AppError> {
        let bets = self.bets.read().await;
        let mut found: Vec<BetModel> = bets
            .values()
            .filter(|bet| bet.race_id == race_id && bet.category == category)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(found)
    }
}

/// SQLite implementation of BetRepository
pub struct SqliteBetRepository {
    pool: SqlitePool,
}

impl SqliteBetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn bet_from_row(row: &SqliteRow) -> Result<BetModel, AppError> {
    let category: String = row.get("category");
    let predictions: String = row.get("predictions");

    Ok(BetModel {
        user_id: row.get("user_id"),
        username: row.get("username"),
        race_id: row.get("race_id"),
        category: category
            .parse()
            .map_err(|_| AppError::DatabaseError(format!("Unknown stored category `{category}`")))?,
        predictions: serde_json::from_str(&predictions)
            .map_err(|e| AppError::DatabaseError(format!("Corrupt stored predictions: {e}")))?,
        updated_at: row.get("updated_at"),
    })
}

#[async_trait]
impl BetRepository for SqliteBetRepository {
    #[instrument(skip(self, bet), fields(user_id = %bet.user_id, race_id = bet.race_id, category = %bet.category))]
    async fn upsert_bet(&self, bet: &BetModel) -> Result<(), AppError> {
        let predictions = serde_json::to_string(&bet.predictions)
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO bets (user_id, username, race_id, category, predictions, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, race_id, category) DO UPDATE SET
                username = excluded.username,
                predictions = excluded.predictions,
                updated_at = excluded.updated_at",
        )
        .bind(&bet.user_id)
        .bind(&bet.username)
        .bind(bet.race_id)
        .bind(bet.category.as_ref())
        .bind(predictions)
        .bind(bet.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("upsert bet"))?;

        debug!("Bet upserted");
        Ok(())
    }

    async fn list_user_bets(&self, user_id: &str, race_id: i64) -> Result<Vec<BetModel>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, username, race_id, category, predictions, updated_at
             FROM bets WHERE user_id = ? AND race_id = ?",
        )
        .bind(user_id)
        .bind(race_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list user bets"))?;

        let mut bets = rows.iter().map(bet_from_row).collect::<Result<Vec<_>, _>>()?;
        bets.sort_by_key(|bet| bet.category);
        Ok(bets)
    }

    async fn list_race_category_bets(
        &self,
        race_id: i64,
        category: Category,
    ) -> Result<Vec<BetModel>, AppError> {
        let rows = sqlx::query(
            "SELECT user_id, username, race_id, category, predictions, updated_at
             FROM bets WHERE race_id = ? AND category = ? ORDER BY user_id",
        )
        .bind(race_id)
        .bind(category.as_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list race category bets"))?;

        rows.iter().map(bet_from_row).collect()
    }
}
