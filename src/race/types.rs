use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{RaceModel, Session};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session: Session,
    pub starts_at: DateTime<Utc>,
    pub locked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEntry {
    pub round: i32,
    pub name: String,
    pub circuit: String,
    pub country: String,
    pub sprint_weekend: bool,
    pub sessions: Vec<SessionSummary>,
}

impl From<&RaceModel> for CalendarEntry {
    fn from(race: &RaceModel) -> Self {
        let sessions = race
            .sessions()
            .into_iter()
            .filter_map(|session| {
                race.session_start(session).map(|starts_at| SessionSummary {
                    session,
                    starts_at,
                    locked: race.is_locked(session),
                })
            })
            .collect();

        Self {
            round: race.round,
            name: race.name.clone(),
            circuit: race.circuit.clone(),
            country: race.country.clone(),
            sprint_weekend: race.has_sprint(),
            sessions,
        }
    }
}

/// Response for GET /calendar
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CalendarResponse {
    pub season: i32,
    pub past: Vec<CalendarEntry>,
    pub upcoming: Vec<CalendarEntry>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CalendarSyncResponse {
    pub season: i32,
    pub races_synced: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionLockResponse {
    pub round: i32,
    pub race_name: String,
    pub session: Session,
    pub locked: bool,
}
