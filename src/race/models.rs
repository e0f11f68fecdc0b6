use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::category::Category;

/// The three lockable sessions of a race weekend
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Session {
    Quali,
    Sprint,
    Race,
}

impl Session {
    pub fn label(self) -> &'static str {
        match self {
            Session::Quali => "Qualifying",
            Session::Sprint => "Sprint",
            Session::Race => "Race",
        }
    }

    /// Typical session length; results are polled once it has elapsed
    pub fn estimated_duration(self) -> Duration {
        match self {
            Session::Quali => Duration::hours(2),
            Session::Sprint => Duration::hours(1),
            Session::Race => Duration::hours(3),
        }
    }

    /// Category whose stored result marks the session as having results
    pub fn sentinel_category(self) -> Category {
        match self {
            Session::Quali => Category::Pole,
            Session::Sprint => Category::SprintWinner,
            Session::Race => Category::Winner,
        }
    }
}

/// Betting lifecycle of one session: OPEN → LOCKED → RESULTS_RECORDED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    Locked,
    ResultsRecorded,
}

impl SessionState {
    pub fn derive(locked: bool, has_results: bool) -> Self {
        match (locked, has_results) {
            (_, true) => SessionState::ResultsRecorded,
            (true, false) => SessionState::Locked,
            (false, false) => SessionState::Open,
        }
    }
}

/// Database model for races table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct RaceModel {
    pub id: i64,
    pub season: i32,
    pub round: i32,
    pub name: String,
    pub circuit: String,
    pub country: String,
    pub quali_date: DateTime<Utc>,
    pub sprint_date: Option<DateTime<Utc>>, // None on non-sprint weekends
    pub race_date: DateTime<Utc>,
    pub quali_locked: bool,
    pub sprint_locked: bool,
    pub race_locked: bool,
}

impl RaceModel {
    pub fn has_sprint(&self) -> bool {
        self.sprint_date.is_some()
    }

    /// Scheduled start of a session, None for the sprint of a non-sprint weekend
    pub fn session_start(&self, session: Session) -> Option<DateTime<Utc>> {
        match session {
            Session::Quali => Some(self.quali_date),
            Session::Sprint => self.sprint_date,
            Session::Race => Some(self.race_date),
        }
    }

    pub fn is_locked(&self, session: Session) -> bool {
        match session {
            Session::Quali => self.quali_locked,
            Session::Sprint => self.sprint_locked,
            Session::Race => self.race_locked,
        }
    }

    pub fn set_locked(&mut self, session: Session, locked: bool) {
        match session {
            Session::Quali => self.quali_locked = locked,
            Session::Sprint => self.sprint_locked = locked,
            Session::Race => self.race_locked = locked,
        }
    }

    /// Sessions actually held this weekend, in running order
    pub fn sessions(&self) -> Vec<Session> {
        let mut sessions = vec![Session::Quali];
        if self.has_sprint() {
            sessions.push(Session::Sprint);
        }
        sessions.push(Session::Race);
        sessions
    }

    /// Sessions whose start time has passed but which are still open
    pub fn sessions_due_for_lock(&self, now: DateTime<Utc>) -> Vec<Session> {
        self.sessions()
            .into_iter()
            .filter(|session| !self.is_locked(*session))
            .filter(|session| {
                self.session_start(*session)
                    .map(|start| start <= now)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn accepts_category(&self, category: Category) -> bool {
        category.session() != Session::Sprint || self.has_sprint()
    }

    pub fn is_category_locked(&self, category: Category) -> bool {
        self.is_locked(category.session())
    }

    /// Categories that can still be bet on, in weekend order
    pub fn open_categories(&self) -> Vec<Category> {
        Category::iter()
            .filter(|category| self.accepts_category(*category))
            .filter(|category| !self.is_category_locked(*category))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{at, race};
    use super::*;
    use std::str::FromStr;

    #[test]
    fn nothing_is_due_before_qualifying() {
        let race = race(1, 1, at(8, 15), false);
        assert!(race.sessions_due_for_lock(at(7, 13)).is_empty());
    }

    #[test]
    fn session_is_due_exactly_at_start() {
        let race = race(1, 1, at(8, 15), false);
        assert_eq!(race.sessions_due_for_lock(at(7, 15)), vec![Session::Quali]);
    }

    #[test]
    fn locked_sessions_are_not_due_again() {
        let mut race = race(1, 1, at(8, 15), false);
        race.set_locked(Session::Quali, true);
        assert_eq!(race.sessions_due_for_lock(at(8, 16)), vec![Session::Race]);
    }

    #[test]
    fn sprint_only_considered_on_sprint_weekends() {
        let classic = race(1, 1, at(8, 15), false);
        assert_eq!(classic.sessions(), vec![Session::Quali, Session::Race]);
        assert!(!classic.accepts_category(Category::SprintPodium));

        let sprint = race(2, 2, at(15, 15), true);
        assert_eq!(
            sprint.sessions_due_for_lock(at(14, 20)),
            vec![Session::Quali, Session::Sprint]
        );
        assert!(sprint.accepts_category(Category::SprintPodium));
    }

    #[test]
    fn open_categories_follow_locks() {
        let mut race = race(1, 1, at(8, 15), false);
        race.set_locked(Session::Quali, true);

        assert_eq!(
            race.open_categories(),
            vec![
                Category::Winner,
                Category::Podium,
                Category::LastRace,
                Category::FastestLap
            ]
        );
        assert!(race.is_category_locked(Category::Top3Quali));
    }

    #[test]
    fn session_state_progression() {
        assert_eq!(SessionState::derive(false, false), SessionState::Open);
        assert_eq!(SessionState::derive(true, false), SessionState::Locked);
        assert_eq!(SessionState::derive(true, true), SessionState::ResultsRecorded);
    }

    #[test]
    fn session_parses_from_path_segment() {
        assert_eq!(Session::from_str("quali").unwrap(), Session::Quali);
        assert_eq!(Session::Sprint.to_string(), "sprint");
        assert!(Session::from_str("practice").is_err());
    }
}
