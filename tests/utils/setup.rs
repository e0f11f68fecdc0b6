use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use f1_pronos::{
    bet::PlaceBetInput, config::Config, create_router, db, AppError, AppState, Category,
    RaceModel, Repositories,
};

use super::fakes::{season_calendar, FakeProvider, RecordingNotifier};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub const OWNER_ID: &str = "owner-1";
pub const ADMIN_ROLE: &str = "role-admin";

pub fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|code| code.to_string()).collect()
}

fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("AUTH_SECRET", "integration-secret"),
        ("OWNER_ID", OWNER_ID),
        ("ADMIN_ROLE_ID", ADMIN_ROLE),
        ("WIZARD_TIMEOUT_SECS", "300"),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|value| value.to_string())).unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub provider: FakeProvider,
    pub notifier: RecordingNotifier,
}

pub struct TestAppBuilder {
    sqlite: bool,
    sync_calendar: bool,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            sqlite: false,
            sync_calendar: true,
        }
    }

    /// Backs the app with an in-memory SQLite database instead of the in-memory repositories
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub fn without_calendar_sync(mut self) -> Self {
        self.sync_calendar = false;
        self
    }

    pub async fn build(self) -> TestApp {
        let repositories = if self.sqlite {
            let pool = db::connect_in_memory().await.unwrap();
            db::run_migrations(&pool).await.unwrap();
            Repositories::sqlite(pool)
        } else {
            Repositories::in_memory()
        };

        let provider = FakeProvider::with_calendar(season_calendar());
        let notifier = RecordingNotifier::default();
        let state = AppState::new(
            &test_config(),
            repositories,
            Arc::new(provider.clone()),
            Arc::new(notifier.clone()),
        );

        if self.sync_calendar {
            state.race_service.sync_calendar().await.unwrap();
        }

        TestApp {
            state,
            provider,
            notifier,
        }
    }
}

impl TestApp {
    pub async fn race(&self, round: i32) -> RaceModel {
        self.state.race_service.get_by_round(round).await.unwrap()
    }

    pub async fn bet(
        &self,
        user_id: &str,
        round: i32,
        category: Category,
        picks: &[&str],
    ) -> Result<(), AppError> {
        let race = self.race(round).await;
        self.state
            .bet_service
            .place_bet(PlaceBetInput {
                user_id: user_id.to_string(),
                username: user_id.to_string(),
                race_id: race.id,
                category,
                predictions: codes(picks),
            })
            .await
            .map(|_| ())
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub fn token(&self, user_id: &str, roles: &[&str]) -> String {
        let token = self
            .state
            .token_config
            .create_token(
                user_id.to_string(),
                user_id.to_string(),
                roles.iter().map(|role| role.to_string()).collect(),
            )
            .unwrap();
        format!("Bearer {token}")
    }

    pub fn admin_token(&self) -> String {
        self.token(OWNER_ID, &[])
    }

    /// Sends one request through the full router and decodes the JSON body
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("Authorization", token);
        }
        let request = match body {
            Some(body) => request
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
