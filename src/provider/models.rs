use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One calendar entry as published by the results provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceInfo {
    pub season: i32,
    pub round: i32,
    pub name: String,
    pub circuit: String,
    pub country: String,
    pub quali_date: DateTime<Utc>,
    pub sprint_date: Option<DateTime<Utc>>,
    pub race_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyingResults {
    pub pole: String,
    pub top3: Vec<String>,
    pub last: String,
}

/// Classification of a race or a sprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResults {
    pub winner: String,
    pub podium: Vec<String>,
    pub last: String,
    pub fastest_lap: Option<String>,
}
