pub mod error;
pub mod jolpica;
pub mod models;

use async_trait::async_trait;

pub use error::{ProviderError, ProviderResult};
pub use jolpica::JolpicaProvider;
pub use models::{QualifyingResults, RaceInfo, RaceResults};

/// Source of the season calendar and official classifications.
///
/// Result lookups return `None` both when the classification is not published
/// yet and when the request failed; callers simply retry on the next poll.
#[async_trait]
pub trait ResultsProvider: Send + Sync {
    async fn fetch_season_calendar(&self, season: i32) -> ProviderResult<Vec<RaceInfo>>;

    async fn fetch_qualifying_results(&self, round: i32, season: i32) -> Option<QualifyingResults>;

    async fn fetch_race_results(&self, round: i32, season: i32) -> Option<RaceResults>;

    async fn fetch_sprint_results(&self, round: i32, season: i32) -> Option<RaceResults>;
}
