use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::service::ScoringService;
use crate::bet::service::normalize_picks;
use crate::category::Category;
use crate::notify::{embeds, Notifier};
use crate::provider::{RaceResults, ResultsProvider};
use crate::race::{RaceModel, RaceService, Session};
use crate::shared::AppError;

/// Round-level summary returned to admins
#[derive(Debug, Clone, PartialEq)]
pub struct RoundFetchSummary {
    pub round: i32,
    pub recorded: Vec<Category>,
}

/// Moves official classifications from the provider into stored results,
/// scores them and announces the outcome
pub struct ResultsPipeline {
    races: Arc<RaceService>,
    scoring: Arc<ScoringService>,
    provider: Arc<dyn ResultsProvider>,
    notifier: Arc<dyn Notifier>,
}

fn race_like_categories(
    results: RaceResults,
    winner: Category,
    podium: Category,
    last: Category,
    fastest_lap: Category,
) -> Vec<(Category, Vec<String>)> {
    let mut categories = vec![
        (winner, vec![results.winner]),
        (podium, results.podium),
        (last, vec![results.last]),
    ];
    if let Some(code) = results.fastest_lap {
        categories.push((fastest_lap, vec![code]));
    }
    categories
}

impl ResultsPipeline {
    pub fn new(
        races: Arc<RaceService>,
        scoring: Arc<ScoringService>,
        provider: Arc<dyn ResultsProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            races,
            scoring,
            provider,
            notifier,
        }
    }

    async fn fetch_session(&self, race: &RaceModel, session: Session) -> Vec<(Category, Vec<String>)> {
        match session {
            Session::Quali => self
                .provider
                .fetch_qualifying_results(race.round, race.season)
                .await
                .map(|quali| {
                    vec![
                        (Category::Pole, vec![quali.pole]),
                        (Category::Top3Quali, quali.top3),
                        (Category::LastQuali, vec![quali.last]),
                    ]
                })
                .unwrap_or_default(),
            Session::Sprint if !race.has_sprint() => Vec::new(),
            Session::Sprint => self
                .provider
                .fetch_sprint_results(race.round, race.season)
                .await
                .map(|sprint| {
                    race_like_categories(
                        sprint,
                        Category::SprintWinner,
                        Category::SprintPodium,
                        Category::SprintLast,
                        Category::SprintFastestLap,
                    )
                })
                .unwrap_or_default(),
            Session::Race => self
                .provider
                .fetch_race_results(race.round, race.season)
                .await
                .map(|results| {
                    race_like_categories(
                        results,
                        Category::Winner,
                        Category::Podium,
                        Category::LastRace,
                        Category::FastestLap,
                    )
                })
                .unwrap_or_default(),
        }
    }

    pub async fn has_session_results(&self, race: &RaceModel, session: Session) -> Result<bool, AppError> {
        self.scoring
            .has_result(race.id, session.sentinel_category())
            .await
    }

    async fn record_and_score(
        &self,
        race: &RaceModel,
        category: Category,
        results: Vec<String>,
    ) -> Result<usize, AppError> {
        self.scoring.record_result(race.id, category, results).await?;
        self.scoring.score_category(race.id, category).await
    }

    async fn announce(&self, race: &RaceModel, category: Category, actual: &[String]) -> Result<(), AppError> {
        let scores = self.scoring.category_scores(race.id, category).await?;
        self.notifier
            .broadcast(&embeds::results_announcement(race, category, actual, &scores))
            .await;
        Ok(())
    }

    /// Fetches one session's classification; locks, records, scores and announces
    /// it when available. Categories that already hold a stored result are kept
    /// unless `overwrite` is set (admin refetch). Returns the categories recorded.
    #[instrument(skip(self, race), fields(race_id = race.id, round = race.round))]
    pub async fn fetch_and_score_session(
        &self,
        race: &RaceModel,
        session: Session,
        overwrite: bool,
    ) -> Result<Vec<Category>, AppError> {
        let fetched = self.fetch_session(race, session).await;
        if fetched.is_empty() {
            info!("Results not available yet");
            return Ok(Vec::new());
        }

        // results only ever land on a locked session
        self.races.lock_session(race, session).await?;

        let mut recorded = Vec::new();
        for (category, results) in fetched {
            if !overwrite && self.scoring.has_result(race.id, category).await? {
                debug!(category = %category, "Stored result kept");
                continue;
            }
            let scored = self.record_and_score(race, category, results.clone()).await?;
            info!(category = %category, scored, "Category recorded from provider");
            recorded.push((category, results));
        }

        for (category, results) in &recorded {
            self.announce(race, *category, results).await?;
        }

        Ok(recorded.into_iter().map(|(category, _)| category).collect())
    }

    /// Admin fetch of every session of a round
    #[instrument(skip(self))]
    pub async fn fetch_and_score_round(&self, round: i32) -> Result<RoundFetchSummary, AppError> {
        let race = self.races.get_by_round(round).await?;

        let mut recorded = Vec::new();
        for session in race.sessions() {
            recorded.extend(self.fetch_and_score_session(&race, session, true).await?);
        }

        if recorded.is_empty() {
            return Err(AppError::NotFound(format!(
                "No results published yet for {}",
                race.name
            )));
        }

        Ok(RoundFetchSummary { round, recorded })
    }

    /// Admin-supplied result for one category; locks the session first
    #[instrument(skip(self, codes))]
    pub async fn record_manual_result(
        &self,
        round: i32,
        category: Category,
        codes: Vec<String>,
    ) -> Result<usize, AppError> {
        let race = self.races.get_by_round(round).await?;
        if !race.accepts_category(category) {
            return Err(AppError::Validation(format!(
                "{} has no sprint session",
                race.name
            )));
        }
        let codes = normalize_picks(category, &codes)?;

        self.races.lock_session(&race, category.session()).await?;
        let scored = self.record_and_score(&race, category, codes.clone()).await?;
        self.announce(&race, category, &codes).await?;

        info!(scored, "Manual result recorded");
        Ok(scored)
    }
}
