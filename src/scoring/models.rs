use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Official outcome of one race category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultModel {
    pub race_id: i64,
    pub category: Category,
    pub results: Vec<String>,
}

/// Why a bet earned its points
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub correct_pilots: Vec<String>,
    pub bonus_exact_order: bool,
    pub breakdown: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOutcome {
    pub points: i32,
    pub detail: ScoreDetail,
}

/// Computed points for one bet; unique per (user, race, category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreModel {
    pub user_id: String,
    pub username: String,
    pub race_id: i64,
    pub category: Category,
    pub points: i32,
    pub detail: ScoreDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: String,
    pub username: String,
    pub total_points: i64,
}

/// Ranks (user_id, username, total) rows by total descending, user id ascending
pub fn rank_totals(mut totals: Vec<(String, String, i64)>) -> Vec<LeaderboardEntry> {
    totals.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    totals
        .into_iter()
        .enumerate()
        .map(|(index, (user_id, username, total_points))| LeaderboardEntry {
            rank: index + 1,
            user_id,
            username,
            total_points,
        })
        .collect()
}
