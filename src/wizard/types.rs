use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::service::{ConfirmationReport, WizardOutcome};
use super::state::WizardState;
use crate::bet::types::PickedPilot;
use crate::category::Category;

/// Request body for POST /wizard
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StartWizardRequest {
    #[serde(default)]
    pub round: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StepView {
    pub index: usize,
    pub total: usize,
    pub category: Category,
    pub label: String,
    pub pick_count: usize,
    pub picked: Vec<PickedPilot>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CollectedView {
    pub category: Category,
    pub label: String,
    pub predictions: Vec<PickedPilot>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RejectedView {
    pub category: Category,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ConfirmationView {
    pub saved: Vec<Category>,
    pub rejected: Vec<RejectedView>,
}

impl From<ConfirmationReport> for ConfirmationView {
    fn from(report: ConfirmationReport) -> Self {
        Self {
            saved: report.saved,
            rejected: report
                .rejected
                .into_iter()
                .map(|r| RejectedView {
                    category: r.category,
                    reason: r.reason,
                })
                .collect(),
        }
    }
}

/// Response for every wizard endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WizardView {
    pub id: String,
    pub round: i32,
    pub race_name: String,
    pub state: WizardState,
    pub step: Option<StepView>,
    pub collected: Vec<CollectedView>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<ConfirmationView>,
}

impl From<WizardOutcome> for WizardView {
    fn from(outcome: WizardOutcome) -> Self {
        let session = outcome.session;

        let step = match &session.state {
            WizardState::AwaitingPick { step, partial } => {
                session.steps.get(*step).map(|category| StepView {
                    index: *step,
                    total: session.steps.len(),
                    category: *category,
                    label: category.label().to_string(),
                    pick_count: category.pick_count(),
                    picked: PickedPilot::list(partial),
                })
            }
            _ => None,
        };

        Self {
            id: session.id,
            round: outcome.race.round,
            race_name: outcome.race.name,
            state: session.state,
            step,
            collected: session
                .collected
                .iter()
                .map(|pick| CollectedView {
                    category: pick.category,
                    label: pick.category.label().to_string(),
                    predictions: PickedPilot::list(&pick.predictions),
                })
                .collect(),
            expires_at: session.expires_at,
            confirmation: outcome.confirmation.map(ConfirmationView::from),
        }
    }
}
