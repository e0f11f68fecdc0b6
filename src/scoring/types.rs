use serde::{Deserialize, Serialize};

use super::models::LeaderboardEntry;
use crate::category::Category;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SeasonLeaderboardResponse {
    pub season: i32,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RaceLeaderboardResponse {
    pub round: i32,
    pub race_name: String,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FetchResultsResponse {
    pub round: i32,
    pub recorded: Vec<Category>,
}

/// Request body for PUT /admin/rounds/:round/results/:category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualResultRequest {
    pub results: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ManualResultResponse {
    pub round: i32,
    pub category: Category,
    pub scored: usize,
}
