use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;

/// One user's prediction for a race category; unique per (user, race, category)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetModel {
    pub user_id: String,
    pub username: String,
    pub race_id: i64,
    pub category: Category,
    pub predictions: Vec<String>,
    pub updated_at: DateTime<Utc>,
}
