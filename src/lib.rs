//! Shelfkeeper Library Reservation Server
//!
//! REST JSON API for a library's books, borrower balances and reservations, with
//! daily jobs that send return reminders and charge late fees.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
