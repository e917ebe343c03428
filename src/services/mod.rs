//! Business logic services

pub mod catalog;
pub mod loans;
pub mod stats;

use std::sync::Arc;

use crate::{config::LoansConfig, error::AppResult, repository::LibraryStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub stats: stats::StatsService,
    store: Arc<dyn LibraryStore>,
}

impl Services {
    /// Create all services over the given store
    pub fn new(store: Arc<dyn LibraryStore>, loans_config: LoansConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(store.clone()),
            loans: loans::LoansService::new(store.clone(), loans_config),
            stats: stats::StatsService::new(store.clone()),
            store,
        }
    }

    /// Check that the store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
