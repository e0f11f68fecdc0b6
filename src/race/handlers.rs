use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use tracing::{info, instrument};

use super::{
    models::Session,
    types::{CalendarEntry, CalendarResponse, CalendarSyncResponse, SessionLockResponse},
};
use crate::auth::CallerClaims;
use crate::shared::{AppError, AppState};

/// GET /calendar
#[instrument(skip(state))]
pub async fn get_calendar(State(state): State<AppState>) -> Result<Json<CalendarResponse>, AppError> {
    let window = state.race_service.calendar_window(Utc::now()).await?;

    Ok(Json(CalendarResponse {
        season: state.race_service.season(),
        past: window.past.iter().map(CalendarEntry::from).collect(),
        upcoming: window.upcoming.iter().map(CalendarEntry::from).collect(),
    }))
}

/// POST /admin/calendar/sync
#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
pub async fn sync_calendar(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
) -> Result<Json<CalendarSyncResponse>, AppError> {
    state.admin_policy.require_admin(&claims)?;

    let races_synced = state.race_service.sync_calendar().await?;
    info!(races_synced, "Calendar synchronized by admin");

    Ok(Json(CalendarSyncResponse {
        season: state.race_service.season(),
        races_synced,
    }))
}

/// POST /admin/rounds/:round/sessions/:session/lock
pub async fn lock_session(
    state: State<AppState>,
    claims: Extension<CallerClaims>,
    path: Path<(i32, String)>,
) -> Result<Json<SessionLockResponse>, AppError> {
    change_lock(state, claims, path, true).await
}

/// POST /admin/rounds/:round/sessions/:session/unlock
pub async fn unlock_session(
    state: State<AppState>,
    claims: Extension<CallerClaims>,
    path: Path<(i32, String)>,
) -> Result<Json<SessionLockResponse>, AppError> {
    change_lock(state, claims, path, false).await
}

#[instrument(skip(state, claims), fields(user_id = %claims.sub))]
async fn change_lock(
    State(state): State<AppState>,
    Extension(claims): Extension<CallerClaims>,
    Path((round, session)): Path<(i32, String)>,
    locked: bool,
) -> Result<Json<SessionLockResponse>, AppError> {
    state.admin_policy.require_admin(&claims)?;

    let session: Session = session
        .parse()
        .map_err(|_| AppError::Validation(format!("Unknown session `{session}`")))?;

    let race = state
        .race_service
        .set_session_lock(round, session, locked)
        .await?;

    Ok(Json(SessionLockResponse {
        round: race.round,
        race_name: race.name,
        session,
        locked,
    }))
}
