use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::state::{WizardAction, WizardError, WizardSession, WizardState};
use super::store::WizardStore;
use crate::bet::{BetService, PlaceBetInput};
use crate::category::Category;
use crate::notify::{embeds, Notifier};
use crate::race::{RaceModel, RaceService};
use crate::shared::AppError;

impl From<WizardError> for AppError {
    fn from(e: WizardError) -> Self {
        match e {
            WizardError::Expired | WizardError::Finished(_) => AppError::Locked(e.to_string()),
            _ => AppError::Validation(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedPick {
    pub category: Category,
    pub reason: String,
}

/// What happened to the collected picks once the user confirmed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfirmationReport {
    pub saved: Vec<Category>,
    pub rejected: Vec<RejectedPick>,
}

#[derive(Debug, Clone)]
pub struct WizardOutcome {
    pub session: WizardSession,
    pub race: RaceModel,
    pub confirmation: Option<ConfirmationReport>,
}

pub struct WizardService {
    store: Arc<WizardStore>,
    races: Arc<RaceService>,
    bets: Arc<BetService>,
    notifier: Arc<dyn Notifier>,
    timeout: Duration,
}

impl WizardService {
    pub fn new(
        store: Arc<WizardStore>,
        races: Arc<RaceService>,
        bets: Arc<BetService>,
        notifier: Arc<dyn Notifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            races,
            bets,
            notifier,
            timeout,
        }
    }

    /// Opens a pick flow over the race's categories that still accept bets
    #[instrument(skip(self, username))]
    pub async fn start(
        &self,
        user_id: &str,
        username: &str,
        round: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<WizardOutcome, AppError> {
        let race = self.races.resolve_round(round).await?;
        let steps = race.open_categories();
        if steps.is_empty() {
            return Err(AppError::Locked(format!("All picks for {} are closed", race.name)));
        }

        let session = WizardSession::new(
            user_id.to_string(),
            username.to_string(),
            race.id,
            steps,
            now,
            self.timeout,
        );
        info!(wizard_id = %session.id, race_id = race.id, steps = session.steps.len(), "Pick wizard started");
        self.store.insert(session.clone()).await;

        Ok(WizardOutcome {
            session,
            race,
            confirmation: None,
        })
    }

    /// Current view of a wizard owned by the caller
    pub async fn view(&self, id: &str, user_id: &str, now: DateTime<Utc>) -> Result<WizardOutcome, AppError> {
        let session = self
            .store
            .update(id, |session| {
                session.expire_if_due(now);
                session.clone()
            })
            .await
            .ok_or_else(|| AppError::NotFound(format!("Pick session {id} not found")))?;

        ensure_owner(&session, user_id)?;
        let race = self.races.get_race(session.race_id).await?;

        Ok(WizardOutcome {
            session,
            race,
            confirmation: None,
        })
    }

    /// Applies an action; on confirmation the collected picks are saved and announced
    #[instrument(skip(self, action))]
    pub async fn apply(
        &self,
        id: &str,
        user_id: &str,
        action: WizardAction,
        now: DateTime<Utc>,
    ) -> Result<WizardOutcome, AppError> {
        let owner = self
            .store
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Pick session {id} not found")))?;
        ensure_owner(&owner, user_id)?;

        let (session, applied) = self
            .store
            .update(id, |session| {
                let applied = session.apply(action, now);
                (session.clone(), applied)
            })
            .await
            .ok_or_else(|| AppError::NotFound(format!("Pick session {id} not found")))?;
        applied?;

        let race = self.races.get_race(session.race_id).await?;
        let confirmation = if session.state == WizardState::Confirmed {
            Some(self.persist(&session, &race).await?)
        } else {
            None
        };

        Ok(WizardOutcome {
            session,
            race,
            confirmation,
        })
    }

    async fn persist(&self, session: &WizardSession, race: &RaceModel) -> Result<ConfirmationReport, AppError> {
        let mut report = ConfirmationReport::default();
        let mut announced = Vec::new();

        for pick in &session.collected {
            let placed = self
                .bets
                .place_bet(PlaceBetInput {
                    user_id: session.user_id.clone(),
                    username: session.username.clone(),
                    race_id: session.race_id,
                    category: pick.category,
                    predictions: pick.predictions.clone(),
                })
                .await;

            match placed {
                Ok(bet) => {
                    report.saved.push(bet.category);
                    announced.push((bet.category, bet.predictions));
                }
                Err(e @ (AppError::Locked(_) | AppError::Validation(_))) => {
                    warn!(category = %pick.category, error = %e, "Confirmed pick rejected");
                    report.rejected.push(RejectedPick {
                        category: pick.category,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if !announced.is_empty() {
            self.notifier
                .broadcast(&embeds::picks_confirmed(&session.username, race, &announced))
                .await;
        }

        info!(
            wizard_id = %session.id,
            saved = report.saved.len(),
            rejected = report.rejected.len(),
            "Pick wizard confirmed"
        );
        Ok(report)
    }

    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        self.store.sweep(now).await
    }
}

fn ensure_owner(session: &WizardSession, user_id: &str) -> Result<(), AppError> {
    if session.user_id != user_id {
        return Err(AppError::Forbidden(
            "This pick session belongs to someone else".to_string(),
        ));
    }
    Ok(())
}
