use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::{AdminPolicy, TokenConfig};
use crate::bet::{
    repository::{BetRepository, InMemoryBetRepository, SqliteBetRepository},
    service::BetService,
};
use crate::config::Config;
use crate::notify::Notifier;
use crate::provider::ResultsProvider;
use crate::race::{
    repository::{InMemoryRaceRepository, RaceRepository, SqliteRaceRepository},
    service::RaceService,
};
use crate::scoring::{
    pipeline::ResultsPipeline,
    repository::{
        InMemoryResultRepository, InMemoryScoreRepository, ResultRepository, ScoreRepository,
        SqliteResultRepository, SqliteScoreRepository,
    },
    service::ScoringService,
};
use crate::wizard::{service::WizardService, store::WizardStore};

/// The four persisted collections
#[derive(Clone)]
pub struct Repositories {
    pub races: Arc<dyn RaceRepository>,
    pub bets: Arc<dyn BetRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub scores: Arc<dyn ScoreRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let races: Arc<dyn RaceRepository> = Arc::new(InMemoryRaceRepository::new());
        Self {
            bets: Arc::new(InMemoryBetRepository::new()),
            results: Arc::new(InMemoryResultRepository::new()),
            scores: Arc::new(InMemoryScoreRepository::new(Arc::clone(&races))),
            races,
        }
    }

    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            races: Arc::new(SqliteRaceRepository::new(pool.clone())),
            bets: Arc::new(SqliteBetRepository::new(pool.clone())),
            results: Arc::new(SqliteResultRepository::new(pool.clone())),
            scores: Arc::new(SqliteScoreRepository::new(pool)),
        }
    }
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub token_config: TokenConfig,
    pub admin_policy: AdminPolicy,
    pub notifier: Arc<dyn Notifier>,
    pub race_service: Arc<RaceService>,
    pub bet_service: Arc<BetService>,
    pub scoring_service: Arc<ScoringService>,
    pub results_pipeline: Arc<ResultsPipeline>,
    pub wizard_service: Arc<WizardService>,
}

impl AppState {
    /// Wires every service on top of the given repositories and collaborators
    pub fn new(
        config: &Config,
        repositories: Repositories,
        provider: Arc<dyn ResultsProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let race_service = Arc::new(RaceService::new(
            Arc::clone(&repositories.races),
            Arc::clone(&provider),
            config.season,
        ));
        let bet_service = Arc::new(BetService::new(
            Arc::clone(&repositories.bets),
            Arc::clone(&repositories.races),
        ));
        let scoring_service = Arc::new(ScoringService::new(
            Arc::clone(&repositories.bets),
            Arc::clone(&repositories.results),
            Arc::clone(&repositories.scores),
        ));
        let results_pipeline = Arc::new(ResultsPipeline::new(
            Arc::clone(&race_service),
            Arc::clone(&scoring_service),
            provider,
            Arc::clone(&notifier),
        ));
        let wizard_timeout = chrono::Duration::from_std(config.wizard_timeout)
            .unwrap_or_else(|_| chrono::Duration::minutes(5));
        let wizard_service = Arc::new(WizardService::new(
            Arc::new(WizardStore::new()),
            Arc::clone(&race_service),
            Arc::clone(&bet_service),
            Arc::clone(&notifier),
            wizard_timeout,
        ));

        Self {
            token_config: TokenConfig::new(&config.auth_secret),
            admin_policy: AdminPolicy::new(config.owner_id.clone(), config.admin_role_id.clone()),
            notifier,
            race_service,
            bet_service,
            scoring_service,
            results_pipeline,
            wizard_service,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Locked: {0}")]
    Locked(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Locked(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Upstream(msg) => {
                error!(error = %msg, "Results provider request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Results provider unavailable, try again later".to_string(),
                )
            }
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, try again later".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, try again later".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
