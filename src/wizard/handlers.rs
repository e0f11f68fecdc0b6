use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use tracing::instrument;

use super::state::WizardAction;
use super::types::{StartWizardRequest, WizardView};
use crate::auth::CallerClaims;
use crate::shared::{AppError, AppState};

/// POST /wizard
#[instrument(skip(state, claims, request), fields(user_id = %claims.sub))]
pub async fn start_wizard(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Json(request): Json<StartWizardRequest>,
) -> Result<(StatusCode, Json<WizardView>), AppError> {
    let outcome = state
        .wizard_service
        .start(&claims.sub, &claims.username, request.round, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}

/// GET /wizard/:id
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn get_wizard(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path(id): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    let outcome = state
        .wizard_service
        .view(&id, &claims.sub, Utc::now())
        .await?;
    Ok(Json(outcome.into()))
}

/// POST /wizard/:id/actions
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn wizard_action(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path(id): Path<String>,
    Json(action): Json<WizardAction>,
) -> Result<Json<WizardView>, AppError> {
    let outcome = state
        .wizard_service
        .apply(&id, &claims.sub, action, Utc::now())
        .await?;
    Ok(Json(outcome.into()))
}
