pub mod calculators;
pub mod pipeline;
pub mod repository;
pub mod service;

mod handlers;
pub mod models;
pub mod types;

pub use calculators::{calculate_points, ScoreCalculator};
pub use handlers::{fetch_results, race_leaderboard, record_manual_result, season_leaderboard};
pub use models::{LeaderboardEntry, ResultModel, ScoreDetail, ScoreModel, ScoreOutcome};
pub use pipeline::ResultsPipeline;
pub use service::ScoringService;
