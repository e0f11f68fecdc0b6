use axum::{
    extract::{Query, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::{
    service::PlaceBetInput,
    types::{
        BetResponse, MyBetEntry, MyBetsQuery, MyBetsResponse, PickedPilot, PlaceBetRequest,
        SessionStatus,
    },
};
use crate::auth::CallerClaims;
use crate::race::SessionState;
use crate::shared::{AppError, AppState};

/// HTTP handler for submitting or replacing a pick
///
/// PUT /bets
#[instrument(skip(state, claims, request), fields(user_id = %claims.sub, category = %request.category))]
pub async fn place_bet(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(request): Json<PlaceBetRequest>,
) -> Result<Json<BetResponse>, AppError> {
    let race = state.race_service.resolve_round(request.round).await?;

    let bet = state
        .bet_service
        .place_bet(PlaceBetInput {
            user_id: claims.sub,
            username: claims.username,
            race_id: race.id,
            category: request.category,
            predictions: request.predictions,
        })
        .await?;

    info!(round = race.round, "Pick saved");

    Ok(Json(BetResponse {
        round: race.round,
        race_name: race.name,
        category: bet.category,
        label: bet.category.label().to_string(),
        predictions: PickedPilot::list(&bet.predictions),
        updated_at: bet.updated_at,
    }))
}

/// HTTP handler listing the caller's picks for a race
///
/// GET /bets/me?round=
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn my_bets(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Query(query): Query<MyBetsQuery>,
) -> Result<Json<MyBetsResponse>, AppError> {
    let race = state.race_service.resolve_round(query.round).await?;
    let bets = state.bet_service.user_bets(&claims.sub, &race).await?;

    let mut sessions = Vec::new();
    for session in race.sessions() {
        let has_results = state
            .scoring_service
            .has_result(race.id, session.sentinel_category())
            .await?;
        sessions.push(SessionStatus {
            session,
            state: SessionState::derive(race.is_locked(session), has_results),
        });
    }

    Ok(Json(MyBetsResponse {
        round: race.round,
        race_name: race.name.clone(),
        sessions,
        bets: bets
            .into_iter()
            .map(|entry| MyBetEntry {
                category: entry.bet.category,
                label: entry.bet.category.label().to_string(),
                predictions: PickedPilot::list(&entry.bet.predictions),
                editable: entry.editable,
            })
            .collect(),
    }))
}
