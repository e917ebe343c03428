//! Bibliotheca Library Server
//!
//! Catalog maintenance, loan tracking and overdue reporting over a REST JSON
//! API. A book's available copies always equal its total copies minus its open
//! loans; see [`inventory`].

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod inventory;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state over an already-open store
    pub fn new(config: AppConfig, store: Arc<dyn repository::LibraryStore>) -> Self {
        let services = services::Services::new(store, config.loans);
        Self {
            services: Arc::new(services),
        }
    }
}
