use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::{
    error::{ProviderError, ProviderResult},
    models::{QualifyingResults, RaceInfo, RaceResults},
    ResultsProvider,
};

const DEFAULT_QUALI_TIME: &str = "14:00:00Z";
const DEFAULT_RACE_TIME: &str = "15:00:00Z";

/// Client for the Jolpica (Ergast-compatible) F1 API
#[derive(Clone)]
pub struct JolpicaProvider {
    client: Client,
    base_url: Arc<str>,
}

impl JolpicaProvider {
    pub fn new(base_url: &str) -> ProviderResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("f1-pronos/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|source| ProviderError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ProviderResult<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(url = %url, "Requesting results API");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ProviderError::RequestSend {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestStatus {
                url,
                status: response.status(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ProviderError::DecodeResponse { url, source })
    }

    /// Fetches a result page; any failure is logged and reported as "not yet available"
    async fn fetch_races(&self, path: &str) -> Option<Vec<ApiRace>> {
        match self.get_json::<ApiResponse>(path).await {
            Ok(response) => Some(response.mr_data.race_table.races),
            Err(e) => {
                warn!(error = %e, path = %path, "Results fetch failed, will retry on next poll");
                None
            }
        }
    }
}

#[async_trait]
impl ResultsProvider for JolpicaProvider {
    #[instrument(skip(self))]
    async fn fetch_season_calendar(&self, season: i32) -> ProviderResult<Vec<RaceInfo>> {
        let response: ApiResponse = self.get_json(&format!("{season}.json")).await?;
        response
            .mr_data
            .race_table
            .races
            .iter()
            .map(race_info_from_api)
            .collect()
    }

    #[instrument(skip(self))]
    async fn fetch_qualifying_results(&self, round: i32, season: i32) -> Option<QualifyingResults> {
        let races = self
            .fetch_races(&format!("{season}/{round}/qualifying.json"))
            .await?;
        qualifying_from_races(races)
    }

    #[instrument(skip(self))]
    async fn fetch_race_results(&self, round: i32, season: i32) -> Option<RaceResults> {
        let races = self
            .fetch_races(&format!("{season}/{round}/results.json"))
            .await?;
        classification_from_races(races, |race| race.results)
    }

    #[instrument(skip(self))]
    async fn fetch_sprint_results(&self, round: i32, season: i32) -> Option<RaceResults> {
        let races = self
            .fetch_races(&format!("{season}/{round}/sprint.json"))
            .await?;
        classification_from_races(races, |race| race.sprint_results)
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(rename = "MRData")]
    mr_data: ApiData,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(rename = "RaceTable")]
    race_table: ApiRaceTable,
}

#[derive(Debug, Deserialize)]
struct ApiRaceTable {
    #[serde(rename = "Races", default)]
    races: Vec<ApiRace>,
}

#[derive(Debug, Deserialize)]
struct ApiRace {
    season: String,
    round: String,
    #[serde(rename = "raceName")]
    race_name: String,
    #[serde(rename = "Circuit")]
    circuit: ApiCircuit,
    date: String,
    time: Option<String>,
    #[serde(rename = "Qualifying")]
    qualifying: Option<ApiSchedule>,
    #[serde(rename = "Sprint")]
    sprint: Option<ApiSchedule>,
    #[serde(rename = "QualifyingResults", default)]
    qualifying_results: Vec<ApiClassified>,
    #[serde(rename = "Results", default)]
    results: Vec<ApiClassified>,
    #[serde(rename = "SprintResults", default)]
    sprint_results: Vec<ApiClassified>,
}

#[derive(Debug, Deserialize)]
struct ApiCircuit {
    #[serde(rename = "circuitName")]
    circuit_name: String,
    #[serde(rename = "Location")]
    location: ApiLocation,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    country: String,
}

#[derive(Debug, Deserialize)]
struct ApiSchedule {
    date: String,
    time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiClassified {
    position: String,
    #[serde(rename = "Driver")]
    driver: ApiDriver,
    #[serde(rename = "FastestLap")]
    fastest_lap: Option<ApiFastestLap>,
}

#[derive(Debug, Deserialize)]
struct ApiDriver {
    code: Option<String>,
    #[serde(rename = "familyName")]
    family_name: String,
}

#[derive(Debug, Deserialize)]
struct ApiFastestLap {
    rank: Option<String>,
}

impl ApiDriver {
    /// Older drivers have no code; derive one from the family name
    fn code(&self) -> String {
        self.code.clone().unwrap_or_else(|| {
            self.family_name
                .chars()
                .filter(|c| c.is_alphabetic())
                .take(3)
                .collect::<String>()
                .to_uppercase()
        })
    }
}

fn parse_session_time(date: &str, time: Option<&str>, default_time: &str) -> ProviderResult<DateTime<Utc>> {
    let raw = format!("{}T{}", date, time.unwrap_or(default_time));
    let invalid = || ProviderError::InvalidDate { value: raw.clone() };

    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())?;
    let clock = time
        .unwrap_or(default_time)
        .trim_end_matches('Z')
        .trim_end_matches("+00:00");
    let clock = NaiveTime::parse_from_str(clock, "%H:%M:%S").map_err(|_| invalid())?;

    Ok(day.and_time(clock).and_utc())
}

fn parse_round(value: &str) -> ProviderResult<i32> {
    value.parse().map_err(|_| ProviderError::InvalidRound {
        value: value.to_string(),
    })
}

fn race_info_from_api(race: &ApiRace) -> ProviderResult<RaceInfo> {
    let quali_date = match &race.qualifying {
        Some(quali) => parse_session_time(&quali.date, quali.time.as_deref(), DEFAULT_QUALI_TIME)?,
        None => parse_session_time(&race.date, None, DEFAULT_QUALI_TIME)?,
    };
    let sprint_date = race
        .sprint
        .as_ref()
        .map(|sprint| parse_session_time(&sprint.date, sprint.time.as_deref(), DEFAULT_RACE_TIME))
        .transpose()?;
    let race_date = parse_session_time(&race.date, race.time.as_deref(), DEFAULT_RACE_TIME)?;

    Ok(RaceInfo {
        season: parse_round(&race.season)?,
        round: parse_round(&race.round)?,
        name: race.race_name.clone(),
        circuit: race.circuit.circuit_name.clone(),
        country: race.circuit.location.country.clone(),
        quali_date,
        sprint_date,
        race_date,
    })
}

/// Orders a classification by finishing position; unparsable positions go last
fn sorted(mut classified: Vec<ApiClassified>) -> Vec<ApiClassified> {
    classified.sort_by_key(|entry| entry.position.parse::<u32>().unwrap_or(u32::MAX));
    classified
}

fn qualifying_from_races(races: Vec<ApiRace>) -> Option<QualifyingResults> {
    let race = races.into_iter().next()?;
    let classified = sorted(race.qualifying_results);
    let first = classified.first()?;
    let last = classified.last()?;

    Some(QualifyingResults {
        pole: first.driver.code(),
        top3: classified.iter().take(3).map(|e| e.driver.code()).collect(),
        last: last.driver.code(),
    })
}

fn classification_from_races<F>(races: Vec<ApiRace>, pick: F) -> Option<RaceResults>
where
    F: FnOnce(ApiRace) -> Vec<ApiClassified>,
{
    let race = races.into_iter().next()?;
    let classified = sorted(pick(race));
    let first = classified.first()?;
    let last = classified.last()?;

    let fastest_lap = classified
        .iter()
        .find(|entry| {
            entry
                .fastest_lap
                .as_ref()
                .and_then(|lap| lap.rank.as_deref())
                == Some("1")
        })
        .map(|entry| entry.driver.code());

    Some(RaceResults {
        winner: first.driver.code(),
        podium: classified.iter().take(3).map(|e| e.driver.code()).collect(),
        last: last.driver.code(),
        fastest_lap,
    })
}
