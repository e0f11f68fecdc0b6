pub use handlers::{get_calendar, lock_session, sync_calendar, unlock_session};
pub use models::{RaceModel, Session, SessionState};
pub use service::RaceService;

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
