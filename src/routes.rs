use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::shared::AppState;
use crate::{auth, bet, pilots, race, scoring, wizard};

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Builds the HTTP command surface. Everything except /health needs a caller token.
pub fn create_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/bets", put(bet::place_bet))
        .route("/bets/me", get(bet::my_bets))
        .route("/wizard", post(wizard::start_wizard))
        .route("/wizard/:id", get(wizard::get_wizard))
        .route("/wizard/:id/actions", post(wizard::wizard_action))
        .route("/leaderboard/season", get(scoring::season_leaderboard))
        .route("/leaderboard/races/:round", get(scoring::race_leaderboard))
        .route("/calendar", get(race::get_calendar))
        .route("/pilots", get(pilots::search_pilots))
        .route("/admin/calendar/sync", post(race::sync_calendar))
        .route(
            "/admin/rounds/:round/results/fetch",
            post(scoring::fetch_results),
        )
        .route(
            "/admin/rounds/:round/results/:category",
            put(scoring::record_manual_result),
        )
        .route(
            "/admin/rounds/:round/sessions/:session/lock",
            post(race::lock_session),
        )
        .route(
            "/admin/rounds/:round/sessions/:session/unlock",
            post(race::unlock_session),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::caller_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{bearer, AppStateBuilder};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn health_needs_no_token() {
        let app = create_router(AppStateBuilder::new().build());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn commands_need_a_valid_token() {
        let app = create_router(AppStateBuilder::new().build());

        let missing = app
            .clone()
            .oneshot(Request::builder().uri("/calendar").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let forged = app
            .oneshot(
                Request::builder()
                    .uri("/calendar")
                    .header("Authorization", "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_refuse_regular_users() {
        let state = AppStateBuilder::new().build();
        let token = bearer(&state, "someone", "bob", &[]);
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/calendar/sync")
                    .header("Authorization", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn pilot_search_returns_matches() {
        let state = AppStateBuilder::new().build();
        let token = bearer(&state, "u1", "alice", &[]);
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/pilots?q=mclaren")
                    .header("Authorization", token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let pilots: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(pilots.len(), 2);
    }
}
