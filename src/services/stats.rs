//! Dashboard statistics

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{dates, loan::CatalogStats},
    repository::LibraryStore,
};

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn LibraryStore>,
}

impl StatsService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// Catalog and loan counters as of a date (today by default)
    pub async fn summary(&self, as_of: Option<NaiveDate>) -> AppResult<CatalogStats> {
        let as_of = as_of.unwrap_or_else(dates::today);
        self.store.stats(as_of).await
    }
}
