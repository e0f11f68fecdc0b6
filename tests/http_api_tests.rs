use axum::http::StatusCode;
use f1_pronos::{
    bet::types::{BetResponse, MyBetsResponse},
    provider::QualifyingResults,
    race::{types::CalendarResponse, SessionState},
    scoring::types::{ManualResultResponse, SeasonLeaderboardResponse},
    Category, Session,
};
use serde_json::{json, Value};

mod utils;

use utils::setup::ADMIN_ROLE;
use utils::*;

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestAppBuilder::new().build().await;

    let (status, body) = app.call("GET", "/bets/me?round=1", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_place_bet_and_list_my_bets() {
    let app = TestAppBuilder::new().build().await;
    let token = app.token("alice", &[]);

    let (status, body) = app
        .call(
            "PUT",
            "/bets",
            Some(&token),
            Some(json!({ "category": "podium", "predictions": ["ver", "nor", "lec"], "round": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let placed: BetResponse = serde_json::from_value(body).unwrap();
    assert_eq!(placed.category, Category::Podium);
    assert_eq!(placed.predictions[0].code, "VER");
    assert_eq!(placed.predictions[0].name, "Max Verstappen");

    let (status, body) = app.call("GET", "/bets/me?round=1", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let mine: MyBetsResponse = serde_json::from_value(body).unwrap();
    assert_eq!(mine.round, 1);
    assert_eq!(mine.bets.len(), 1);
    assert!(mine.bets[0].editable);
    assert!(mine
        .sessions
        .iter()
        .all(|status| status.state == SessionState::Open));
}

#[tokio::test]
async fn test_invalid_pick_count_is_a_bad_request() {
    let app = TestAppBuilder::new().build().await;
    let token = app.token("alice", &[]);

    let (status, body) = app
        .call(
            "PUT",
            "/bets",
            Some(&token),
            Some(json!({ "category": "winner", "predictions": ["VER", "NOR"], "round": 1 })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Race Winner"));
}

#[tokio::test]
async fn test_admin_lock_closes_bets_for_the_session() {
    let app = TestAppBuilder::new().build().await;
    let admin = app.admin_token();
    let user = app.token("alice", &[]);

    let (status, body) = app
        .call("POST", "/admin/rounds/1/sessions/quali/lock", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["locked"], Value::Bool(true));

    let (status, _) = app
        .call(
            "PUT",
            "/bets",
            Some(&user),
            Some(json!({ "category": "pole", "predictions": ["VER"], "round": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call("POST", "/admin/rounds/1/sessions/quali/unlock", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.race(1).await.is_locked(Session::Quali));
}

#[tokio::test]
async fn test_unknown_session_or_sprint_on_regular_weekend_is_rejected() {
    let app = TestAppBuilder::new().build().await;
    let admin = app.admin_token();

    let (status, _) = app
        .call("POST", "/admin/rounds/1/sessions/warmup/lock", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call("POST", "/admin/rounds/1/sessions/sprint/lock", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_role_can_record_manual_results() {
    let app = TestAppBuilder::new().build().await;
    let moderator = app.token("mod-7", &[ADMIN_ROLE]);
    app.bet("alice", 1, Category::Winner, &["VER"]).await.unwrap();

    let (status, body) = app
        .call(
            "PUT",
            "/admin/rounds/1/results/winner",
            Some(&moderator),
            Some(json!({ "results": ["ver"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let recorded: ManualResultResponse = serde_json::from_value(body).unwrap();
    assert_eq!(recorded.scored, 1);

    let token = app.token("alice", &[]);
    let (status, body) = app
        .call("GET", "/leaderboard/season", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let leaderboard: SeasonLeaderboardResponse = serde_json::from_value(body).unwrap();
    assert_eq!(leaderboard.entries[0].user_id, "alice");
    assert_eq!(leaderboard.entries[0].total_points, 10);
}

#[tokio::test]
async fn test_regular_users_cannot_use_admin_commands() {
    let app = TestAppBuilder::new().build().await;
    let token = app.token("alice", &[]);

    let (status, _) = app
        .call(
            "PUT",
            "/admin/rounds/1/results/winner",
            Some(&token),
            Some(json!({ "results": ["VER"] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call("POST", "/admin/rounds/1/results/fetch", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_fetch_reports_missing_results() {
    let app = TestAppBuilder::new().build().await;
    let admin = app.admin_token();

    let (status, _) = app
        .call("POST", "/admin/rounds/1/results/fetch", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.provider
        .publish_qualifying(
            1,
            QualifyingResults {
                pole: "LEC".to_string(),
                top3: codes(&["LEC", "HAM", "PIA"]),
                last: "STR".to_string(),
            },
        )
        .await;

    let (status, body) = app
        .call("POST", "/admin/rounds/1/results/fetch", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recorded"], json!(["pole", "top3_quali", "last_quali"]));
    assert!(app.race(1).await.is_locked(Session::Quali));
}

#[tokio::test]
async fn test_leaderboards_are_not_found_before_any_score() {
    let app = TestAppBuilder::new().build().await;
    let token = app.token("alice", &[]);

    let (status, _) = app
        .call("GET", "/leaderboard/season", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("GET", "/leaderboard/races/1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("GET", "/leaderboard/races/42", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_lists_synced_races() {
    let app = TestAppBuilder::new().build().await;
    let token = app.token("alice", &[]);

    let (status, body) = app.call("GET", "/calendar", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let calendar: CalendarResponse = serde_json::from_value(body).unwrap();
    assert_eq!(calendar.season, 2026);
    let rounds: Vec<i32> = calendar
        .past
        .iter()
        .chain(calendar.upcoming.iter())
        .map(|entry| entry.round)
        .collect();
    assert_eq!(rounds, vec![1, 2]);
}

#[tokio::test]
async fn test_calendar_sync_through_admin_command() {
    let app = TestAppBuilder::new().without_calendar_sync().build().await;
    let admin = app.admin_token();

    let (status, body) = app
        .call("POST", "/admin/calendar/sync", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["races_synced"], json!(2));

    app.provider.set_calendar_down(true).await;
    let (status, body) = app
        .call("POST", "/admin/calendar/sync", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_wizard_over_http() {
    let app = TestAppBuilder::new().build().await;
    let token = app.token("alice", &[]);

    let (status, body) = app
        .call("POST", "/wizard", Some(&token), Some(json!({ "round": 1 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["state"]["status"], "awaiting_pick");
    assert_eq!(body["step"]["category"], "pole");
    let id = body["id"].as_str().unwrap().to_string();

    let uri = format!("/wizard/{id}/actions");
    let (status, body) = app
        .call(
            "POST",
            &uri,
            Some(&token),
            Some(json!({ "type": "select", "pilot": "ver" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"]["category"], "top3_quali");
    assert_eq!(body["collected"][0]["predictions"][0]["code"], "VER");

    let (status, _) = app
        .call("POST", &uri, Some(&token), Some(json!({ "type": "confirm" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let other = app.token("bob", &[]);
    let (status, _) = app
        .call("GET", &format!("/wizard/{id}"), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
