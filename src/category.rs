use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::race::models::Session;

/// Every outcome a user can bet on during a race weekend.
///
/// Variants are declared in weekend order (qualifying, sprint, race) which is
/// also the order the pick wizard walks through them.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Pole,
    #[serde(rename = "top3_quali")]
    #[strum(serialize = "top3_quali")]
    Top3Quali,
    LastQuali,
    SprintWinner,
    SprintPodium,
    SprintLast,
    SprintFastestLap,
    Winner,
    Podium,
    LastRace,
    FastestLap,
}

/// How a category turns predictions into points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringShape {
    /// One pick, all-or-nothing
    Single { correct: i32 },
    /// Three picks, credited per member of the actual set plus an exact-order bonus
    Set { per_pilot: i32, order_bonus: i32 },
}

impl ScoringShape {
    pub fn pick_count(&self) -> usize {
        match self {
            ScoringShape::Single { .. } => 1,
            ScoringShape::Set { .. } => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRule {
    pub session: Session,
    pub shape: ScoringShape,
    pub label: &'static str,
}

impl CategoryRule {
    const fn single(session: Session, correct: i32, label: &'static str) -> Self {
        Self {
            session,
            shape: ScoringShape::Single { correct },
            label,
        }
    }

    const fn set(session: Session, per_pilot: i32, order_bonus: i32, label: &'static str) -> Self {
        Self {
            session,
            shape: ScoringShape::Set {
                per_pilot,
                order_bonus,
            },
            label,
        }
    }

    pub fn pick_count(&self) -> usize {
        self.shape.pick_count()
    }
}

impl Category {
    /// Point table and session mapping for the category
    pub const fn rule(self) -> CategoryRule {
        match self {
            Category::Pole => CategoryRule::single(Session::Quali, 5, "Pole Position"),
            Category::Top3Quali => CategoryRule::set(Session::Quali, 3, 5, "Qualifying Top 3"),
            Category::LastQuali => CategoryRule::single(Session::Quali, 3, "Last in Qualifying"),
            Category::SprintWinner => CategoryRule::single(Session::Sprint, 5, "Sprint Winner"),
            Category::SprintPodium => CategoryRule::set(Session::Sprint, 3, 5, "Sprint Podium"),
            Category::SprintLast => CategoryRule::single(Session::Sprint, 2, "Last in Sprint"),
            Category::SprintFastestLap => {
                CategoryRule::single(Session::Sprint, 2, "Sprint Fastest Lap")
            }
            Category::Winner => CategoryRule::single(Session::Race, 10, "Race Winner"),
            Category::Podium => CategoryRule::set(Session::Race, 5, 10, "Race Podium"),
            Category::LastRace => CategoryRule::single(Session::Race, 3, "Last in Race"),
            Category::FastestLap => CategoryRule::single(Session::Race, 3, "Fastest Lap"),
        }
    }

    pub fn session(self) -> Session {
        self.rule().session
    }

    pub fn pick_count(self) -> usize {
        self.rule().pick_count()
    }

    pub fn label(self) -> &'static str {
        self.rule().label
    }

    /// Categories gated by the given session's lock flag, in weekend order
    pub fn for_session(session: Session) -> Vec<Category> {
        Category::iter()
            .filter(|category| category.session() == session)
            .collect()
    }
}
