use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

use super::models::BetModel;
use super::repository::BetRepository;
use crate::category::Category;
use crate::pilots;
use crate::race::{repository::RaceRepository, RaceModel};
use crate::shared::AppError;

#[derive(Debug, Clone)]
pub struct PlaceBetInput {
    pub user_id: String,
    pub username: String,
    pub race_id: i64,
    pub category: Category,
    pub predictions: Vec<String>,
}

/// A stored bet and whether its session still accepts changes
#[derive(Debug, Clone, PartialEq)]
pub struct UserBet {
    pub bet: BetModel,
    pub editable: bool,
}

/// Upper-cases pilot codes and checks count, roster membership and uniqueness
pub fn normalize_picks(category: Category, picks: &[String]) -> Result<Vec<String>, AppError> {
    let expected = category.pick_count();
    if picks.len() != expected {
        return Err(AppError::Validation(format!(
            "{} needs exactly {expected} pilot(s), got {}",
            category.label(),
            picks.len()
        )));
    }

    let normalized: Vec<String> = picks.iter().map(|code| code.trim().to_uppercase()).collect();

    if let Some(unknown) = normalized.iter().find(|code| !pilots::is_known(code)) {
        return Err(AppError::Validation(format!("Unknown pilot `{unknown}`")));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = normalized.iter().find(|code| !seen.insert(code.as_str())) {
        return Err(AppError::Validation(format!("Pilot `{duplicate}` picked twice")));
    }

    Ok(normalized)
}

pub struct BetService {
    bets: Arc<dyn BetRepository>,
    races: Arc<dyn RaceRepository>,
}

impl BetService {
    pub fn new(bets: Arc<dyn BetRepository>, races: Arc<dyn RaceRepository>) -> Self {
        Self { bets, races }
    }

    /// Validates and upserts a prediction while its session is still open
    #[instrument(skip(self, input), fields(user_id = %input.user_id, race_id = input.race_id, category = %input.category))]
    pub async fn place_bet(&self, input: PlaceBetInput) -> Result<BetModel, AppError> {
        let race = self
            .races
            .get_race(input.race_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Race {} not found", input.race_id)))?;

        ensure_open(&race, input.category)?;
        let predictions = normalize_picks(input.category, &input.predictions)?;

        let bet = BetModel {
            user_id: input.user_id,
            username: input.username,
            race_id: race.id,
            category: input.category,
            predictions,
            updated_at: Utc::now(),
        };
        self.bets.upsert_bet(&bet).await?;

        info!(predictions = ?bet.predictions, "Bet placed");
        Ok(bet)
    }

    /// The caller's bets for a race with per-category edit status
    pub async fn user_bets(&self, user_id: &str, race: &RaceModel) -> Result<Vec<UserBet>, AppError> {
        let bets = self.bets.list_user_bets(user_id, race.id).await?;
        Ok(bets
            .into_iter()
            .map(|bet| UserBet {
                editable: !race.is_category_locked(bet.category),
                bet,
            })
            .collect())
    }
}

fn ensure_open(race: &RaceModel, category: Category) -> Result<(), AppError> {
    if !race.accepts_category(category) {
        return Err(AppError::Validation(format!(
            "{} has no sprint, {} cannot be bet on",
            race.name,
            category.label()
        )));
    }
    if race.is_category_locked(category) {
        return Err(AppError::Locked(format!(
            "{} picks for {} are closed",
            category.session().label(),
            race.name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::repository::InMemoryBetRepository;
    use crate::provider::RaceInfo;
    use crate::race::models::{fixtures::at, Session};
    use crate::race::repository::InMemoryRaceRepository;
    use rstest::rstest;

    async fn setup(sprint: bool) -> (BetService, Arc<dyn RaceRepository>, RaceModel) {
        let races: Arc<dyn RaceRepository> = Arc::new(InMemoryRaceRepository::new());
        let race = races
            .upsert_race(&RaceInfo {
                season: 2026,
                round: 1,
                name: "Australian Grand Prix".to_string(),
                circuit: "Albert Park".to_string(),
                country: "Australia".to_string(),
                quali_date: at(7, 5),
                sprint_date: sprint.then(|| at(7, 1)),
                race_date: at(8, 4),
            })
            .await
            .unwrap();
        let service = BetService::new(Arc::new(InMemoryBetRepository::new()), Arc::clone(&races));
        (service, races, race)
    }

    fn input(race_id: i64, category: Category, picks: &[&str]) -> PlaceBetInput {
        PlaceBetInput {
            user_id: "u1".to_string(),
            username: "alice".to_string(),
            race_id,
            category,
            predictions: picks.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn codes_are_normalized_and_upserted() {
        let (service, _, race) = setup(false).await;

        service
            .place_bet(input(race.id, Category::Podium, &["ver", " nor", "LEC"]))
            .await
            .unwrap();
        let bet = service
            .place_bet(input(race.id, Category::Podium, &["lec", "ver", "nor"]))
            .await
            .unwrap();
        assert_eq!(bet.predictions, vec!["LEC", "VER", "NOR"]);

        let stored = service.user_bets("u1", &race).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].bet.predictions, vec!["LEC", "VER", "NOR"]);
        assert!(stored[0].editable);
    }

    #[tokio::test]
    async fn locked_session_rejects_bets() {
        let (service, races, race) = setup(false).await;
        races.set_lock(race.id, Session::Quali, true).await.unwrap();

        let result = service.place_bet(input(race.id, Category::Pole, &["VER"])).await;
        assert!(matches!(result, Err(AppError::Locked(_))));

        // race session still open
        assert!(service
            .place_bet(input(race.id, Category::Winner, &["VER"]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn sprint_categories_need_sprint_weekend() {
        let (service, _, race) = setup(false).await;
        let result = service
            .place_bet(input(race.id, Category::SprintWinner, &["VER"]))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let (service, _, race) = setup(true).await;
        assert!(service
            .place_bet(input(race.id, Category::SprintWinner, &["VER"]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn unknown_race_is_not_found() {
        let (service, _, _) = setup(false).await;
        let result = service.place_bet(input(99, Category::Pole, &["VER"])).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn editable_flag_follows_lock() {
        let (service, races, race) = setup(false).await;
        service
            .place_bet(input(race.id, Category::Pole, &["VER"]))
            .await
            .unwrap();
        races.set_lock(race.id, Session::Quali, true).await.unwrap();

        let race = races.get_race(race.id).await.unwrap().unwrap();
        let bets = service.user_bets("u1", &race).await.unwrap();
        assert!(!bets[0].editable);
    }

    #[rstest]
    #[case::too_few(Category::Podium, &["VER", "NOR"])]
    #[case::too_many(Category::Winner, &["VER", "NOR"])]
    #[case::unknown_pilot(Category::Pole, &["XYZ"])]
    #[case::duplicate(Category::Top3Quali, &["VER", "ver", "NOR"])]
    fn invalid_picks_are_rejected(#[case] category: Category, #[case] picks: &[&str]) {
        let picks: Vec<String> = picks.iter().map(|p| p.to_string()).collect();
        assert!(matches!(
            normalize_picks(category, &picks),
            Err(AppError::Validation(_))
        ));
    }
}
