// Public API - what other modules can use
pub use handlers::{my_bets, place_bet};
pub use models::BetModel;
pub use service::{BetService, PlaceBetInput};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
