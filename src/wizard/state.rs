use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::category::Category;
use crate::pilots;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WizardState {
    AwaitingPick { step: usize, partial: Vec<String> },
    Summary,
    Cancelled,
    Expired,
    Confirmed,
}

impl WizardState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WizardState::Cancelled | WizardState::Expired | WizardState::Confirmed
        )
    }

    fn name(&self) -> &'static str {
        match self {
            WizardState::AwaitingPick { .. } => "awaiting_pick",
            WizardState::Summary => "summary",
            WizardState::Cancelled => "cancelled",
            WizardState::Expired => "expired",
            WizardState::Confirmed => "confirmed",
        }
    }
}

/// Discrete user inputs driving the wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardAction {
    Select { pilot: String },
    Skip,
    Cancel,
    Confirm,
}

impl WizardAction {
    fn name(&self) -> &'static str {
        match self {
            WizardAction::Select { .. } => "select",
            WizardAction::Skip => "skip",
            WizardAction::Cancel => "cancel",
            WizardAction::Confirm => "confirm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("Pick session expired, start a new one")]
    Expired,

    #[error("Pick session already {0}")]
    Finished(&'static str),

    #[error("Unknown pilot `{0}`")]
    UnknownPilot(String),

    #[error("Pilot `{0}` already picked for this category")]
    DuplicatePilot(String),

    #[error("Cannot {action} while {state}")]
    InvalidAction {
        action: &'static str,
        state: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedPick {
    pub category: Category,
    pub predictions: Vec<String>,
}

/// One in-flight pick flow for a user and a race
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSession {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub race_id: i64,
    pub steps: Vec<Category>,
    pub collected: Vec<CollectedPick>,
    pub state: WizardState,
    /// Fixed at start; actions never extend it
    pub expires_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(
        user_id: String,
        username: String,
        race_id: i64,
        steps: Vec<Category>,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Self {
        let state = if steps.is_empty() {
            WizardState::Cancelled
        } else {
            WizardState::AwaitingPick {
                step: 0,
                partial: Vec::new(),
            }
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            username,
            race_id,
            steps,
            collected: Vec::new(),
            state,
            expires_at: now + timeout,
        }
    }

    pub fn current_category(&self) -> Option<Category> {
        match &self.state {
            WizardState::AwaitingPick { step, .. } => self.steps.get(*step).copied(),
            _ => None,
        }
    }

    /// Moves a live session past its deadline to Expired, dropping partial picks
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.state.is_terminal() || now <= self.expires_at {
            return false;
        }
        self.state = WizardState::Expired;
        self.collected.clear();
        true
    }

    fn advance(&mut self, next: usize) {
        self.state = if next < self.steps.len() {
            WizardState::AwaitingPick {
                step: next,
                partial: Vec::new(),
            }
        } else if self.collected.is_empty() {
            WizardState::Cancelled
        } else {
            WizardState::Summary
        };
    }

    /// Applies one user action. The wait window counts from the start of the flow.
    pub fn apply(&mut self, action: WizardAction, now: DateTime<Utc>) -> Result<(), WizardError> {
        if self.state.is_terminal() {
            return Err(WizardError::Finished(self.state.name()));
        }
        if self.expire_if_due(now) {
            return Err(WizardError::Expired);
        }

        match (self.state.clone(), action) {
            (WizardState::AwaitingPick { step, mut partial }, WizardAction::Select { pilot }) => {
                let code = pilot.trim().to_uppercase();
                if !pilots::is_known(&code) {
                    return Err(WizardError::UnknownPilot(code));
                }
                if partial.contains(&code) {
                    return Err(WizardError::DuplicatePilot(code));
                }
                partial.push(code);

                let category = self.steps[step];
                if partial.len() == category.pick_count() {
                    self.collected.push(CollectedPick {
                        category,
                        predictions: partial,
                    });
                    self.advance(step + 1);
                } else {
                    self.state = WizardState::AwaitingPick { step, partial };
                }
            }
            (WizardState::AwaitingPick { step, .. }, WizardAction::Skip) => self.advance(step + 1),
            (_, WizardAction::Cancel) => {
                self.collected.clear();
                self.state = WizardState::Cancelled;
            }
            (WizardState::Summary, WizardAction::Confirm) => self.state = WizardState::Confirmed,
            (state, action) => {
                return Err(WizardError::InvalidAction {
                    action: action.name(),
                    state: state.name(),
                })
            }
        }

        Ok(())
    }
}
