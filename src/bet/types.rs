use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::pilots;
use crate::race::{Session, SessionState};

/// Request body for PUT /bets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceBetRequest {
    pub category: Category,
    pub predictions: Vec<String>,
    /// Defaults to the next open race
    #[serde(default)]
    pub round: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MyBetsQuery {
    pub round: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickedPilot {
    pub code: String,
    pub name: String,
}

impl PickedPilot {
    pub fn list(codes: &[String]) -> Vec<Self> {
        codes
            .iter()
            .map(|code| PickedPilot {
                code: code.clone(),
                name: pilots::display_name(code),
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BetResponse {
    pub round: i32,
    pub race_name: String,
    pub category: Category,
    pub label: String,
    pub predictions: Vec<PickedPilot>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MyBetEntry {
    pub category: Category,
    pub label: String,
    pub predictions: Vec<PickedPilot>,
    pub editable: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionStatus {
    pub session: Session,
    pub state: SessionState,
}

/// Response for GET /bets/me
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MyBetsResponse {
    pub round: i32,
    pub race_name: String,
    pub sessions: Vec<SessionStatus>,
    pub bets: Vec<MyBetEntry>,
}
