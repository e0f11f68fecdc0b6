use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::types::{
    FetchResultsResponse, ManualResultRequest, ManualResultResponse, RaceLeaderboardResponse,
    SeasonLeaderboardResponse,
};
use crate::auth::CallerClaims;
use crate::category::Category;
use crate::shared::{AppError, AppState};

/// GET /leaderboard/season
#[instrument(skip(state))]
pub async fn season_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<SeasonLeaderboardResponse>, AppError> {
    let season = state.race_service.season();
    let entries = state.scoring_service.season_leaderboard(season).await?;

    if entries.is_empty() {
        return Err(AppError::NotFound(format!("No scores yet for the {season} season")));
    }

    Ok(Json(SeasonLeaderboardResponse { season, entries }))
}

/// GET /leaderboard/races/:round
#[instrument(skip(state))]
pub async fn race_leaderboard(
    State(state): State<AppState>,
    Path(round): Path<i32>,
) -> Result<Json<RaceLeaderboardResponse>, AppError> {
    let race = state.race_service.get_by_round(round).await?;
    let entries = state.scoring_service.race_leaderboard(race.id).await?;

    if entries.is_empty() {
        return Err(AppError::NotFound(format!("No scores yet for {}", race.name)));
    }

    Ok(Json(RaceLeaderboardResponse {
        round,
        race_name: race.name,
        entries,
    }))
}

/// POST /admin/rounds/:round/results/fetch
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn fetch_results(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path(round): Path<i32>,
) -> Result<Json<FetchResultsResponse>, AppError> {
    state.admin_policy.require_admin(&claims)?;

    let summary = state.results_pipeline.fetch_and_score_round(round).await?;
    info!(recorded = summary.recorded.len(), "Results fetched by admin");

    Ok(Json(FetchResultsResponse {
        round: summary.round,
        recorded: summary.recorded,
    }))
}

/// PUT /admin/rounds/:round/results/:category
#[instrument(skip(state, claims, request), fields(user_id = %claims.sub))]
pub async fn record_manual_result(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path((round, category)): Path<(i32, String)>,
    Json(request): Json<ManualResultRequest>,
) -> Result<Json<ManualResultResponse>, AppError> {
    state.admin_policy.require_admin(&claims)?;

    let category: Category = category
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown category `{category}`")))?;

    let scored = state
        .results_pipeline
        .record_manual_result(round, category, request.results)
        .await?;

    Ok(Json(ManualResultResponse {
        round,
        category,
        scored,
    }))
}
