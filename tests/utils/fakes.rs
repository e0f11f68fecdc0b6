use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use f1_pronos::{
    notify::Announcement,
    provider::{ProviderError, ProviderResult, QualifyingResults, RaceInfo, RaceResults},
    Notifier, ResultsProvider,
};

// ============================================================================
// Fake Infrastructure
// ============================================================================

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

/// Round 1: regular weekend. Round 2: sprint weekend.
pub fn season_calendar() -> Vec<RaceInfo> {
    vec![
        RaceInfo {
            season: 2026,
            round: 1,
            name: "Australian Grand Prix".to_string(),
            circuit: "Albert Park Grand Prix Circuit".to_string(),
            country: "Australia".to_string(),
            quali_date: at(7, 5),
            sprint_date: None,
            race_date: at(8, 4),
        },
        RaceInfo {
            season: 2026,
            round: 2,
            name: "Chinese Grand Prix".to_string(),
            circuit: "Shanghai International Circuit".to_string(),
            country: "China".to_string(),
            quali_date: at(14, 7),
            sprint_date: Some(at(14, 3)),
            race_date: at(15, 7),
        },
    ]
}

/// Provider whose results can be "published" while a test runs
#[derive(Clone, Default)]
pub struct FakeProvider {
    calendar: Arc<RwLock<Vec<RaceInfo>>>,
    calendar_down: Arc<RwLock<bool>>,
    qualifying: Arc<RwLock<HashMap<i32, QualifyingResults>>>,
    races: Arc<RwLock<HashMap<i32, RaceResults>>>,
    sprints: Arc<RwLock<HashMap<i32, RaceResults>>>,
}

impl FakeProvider {
    pub fn with_calendar(calendar: Vec<RaceInfo>) -> Self {
        Self {
            calendar: Arc::new(RwLock::new(calendar)),
            ..Self::default()
        }
    }

    pub async fn set_calendar_down(&self, down: bool) {
        *self.calendar_down.write().await = down;
    }

    pub async fn publish_qualifying(&self, round: i32, results: QualifyingResults) {
        self.qualifying.write().await.insert(round, results);
    }

    pub async fn publish_race(&self, round: i32, results: RaceResults) {
        self.races.write().await.insert(round, results);
    }

    pub async fn publish_sprint(&self, round: i32, results: RaceResults) {
        self.sprints.write().await.insert(round, results);
    }
}

#[async_trait]
impl ResultsProvider for FakeProvider {
    async fn fetch_season_calendar(&self, _season: i32) -> ProviderResult<Vec<RaceInfo>> {
        if *self.calendar_down.read().await {
            return Err(ProviderError::RequestStatus {
                url: "https://results.invalid/2026.json".to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(self.calendar.read().await.clone())
    }

    async fn fetch_qualifying_results(&self, round: i32, _season: i32) -> Option<QualifyingResults> {
        self.qualifying.read().await.get(&round).cloned()
    }

    async fn fetch_race_results(&self, round: i32, _season: i32) -> Option<RaceResults> {
        self.races.read().await.get(&round).cloned()
    }

    async fn fetch_sprint_results(&self, round: i32, _season: i32) -> Option<RaceResults> {
        self.sprints.read().await.get(&round).cloned()
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<Announcement>>>,
}

impl RecordingNotifier {
    pub async fn sent(&self) -> Vec<Announcement> {
        self.sent.read().await.clone()
    }

    pub async fn titles(&self) -> Vec<String> {
        self.sent
            .read()
            .await
            .iter()
            .map(|announcement| announcement.title.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.write().await.clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn broadcast(&self, announcement: &Announcement) {
        self.sent.write().await.push(announcement.clone());
    }
}
