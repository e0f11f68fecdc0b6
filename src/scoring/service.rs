use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    calculators::calculate_points,
    models::{LeaderboardEntry, ResultModel, ScoreModel},
    repository::{ResultRepository, ScoreRepository},
};
use crate::bet::repository::BetRepository;
use crate::category::Category;
use crate::shared::AppError;

pub struct ScoringService {
    bets: Arc<dyn BetRepository>,
    results: Arc<dyn ResultRepository>,
    scores: Arc<dyn ScoreRepository>,
}

impl ScoringService {
    pub fn new(
        bets: Arc<dyn BetRepository>,
        results: Arc<dyn ResultRepository>,
        scores: Arc<dyn ScoreRepository>,
    ) -> Self {
        Self {
            bets,
            results,
            scores,
        }
    }

    #[instrument(skip(self))]
    pub async fn record_result(
        &self,
        race_id: i64,
        category: Category,
        results: Vec<String>,
    ) -> Result<ResultModel, AppError> {
        let result = ResultModel {
            race_id,
            category,
            results,
        };
        self.results.upsert_result(&result).await?;
        info!("Official result recorded");
        Ok(result)
    }

    pub async fn get_result(&self, race_id: i64, category: Category) -> Result<Option<ResultModel>, AppError> {
        self.results.get_result(race_id, category).await
    }

    pub async fn has_result(&self, race_id: i64, category: Category) -> Result<bool, AppError> {
        Ok(self.results.get_result(race_id, category).await?.is_some())
    }

    /// Recomputes every bet of the category against the stored result.
    /// Returns the number of scores written; zero when no result exists yet.
    #[instrument(skip(self))]
    pub async fn score_category(&self, race_id: i64, category: Category) -> Result<usize, AppError> {
        let Some(result) = self.results.get_result(race_id, category).await? else {
            debug!("No result recorded yet, nothing to score");
            return Ok(0);
        };

        let bets = self.bets.list_race_category_bets(race_id, category).await?;
        for bet in &bets {
            let outcome = calculate_points(category, &bet.predictions, &result.results);
            self.scores
                .upsert_score(&ScoreModel {
                    user_id: bet.user_id.clone(),
                    username: bet.username.clone(),
                    race_id,
                    category,
                    points: outcome.points,
                    detail: outcome.detail,
                })
                .await?;
        }

        info!(scored = bets.len(), "Category scored");
        Ok(bets.len())
    }

    pub async fn category_scores(&self, race_id: i64, category: Category) -> Result<Vec<ScoreModel>, AppError> {
        self.scores.list_race_category_scores(race_id, category).await
    }

    pub async fn season_leaderboard(&self, season: i32) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.scores.season_leaderboard(season).await
    }

    pub async fn race_leaderboard(&self, race_id: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        self.scores.race_leaderboard(race_id).await
    }
}
