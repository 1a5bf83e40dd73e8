//! ShareHub - Peer-to-peer Item Sharing Server
//!
//! A REST JSON API where users list items, other users reserve time windows
//! on them ("bookings"), owners approve or reject requests, and borrowers
//! leave comments after a completed rental.

use std::sync::Arc;

pub mod api;
pub mod clock;
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
