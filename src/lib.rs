// Library crate for the F1 predictions server
// This file exposes the public API for integration tests

pub mod auth;
pub mod bet;
pub mod category;
pub mod config;
pub mod db;
pub mod notify;
pub mod pilots;
pub mod provider;
pub mod race;
pub mod routes;
pub mod scheduler;
pub mod scoring;
pub mod shared;
pub mod wizard;

// Re-export commonly used types for easier access in tests
pub use auth::{AdminPolicy, CallerClaims, TokenConfig};
pub use category::Category;
pub use config::Config;
pub use notify::{Announcement, Notifier};
pub use provider::ResultsProvider;
pub use race::{RaceModel, RaceService, Session, SessionState};
pub use routes::create_router;
pub use shared::{AppError, AppState, Repositories};
