//! Catalog management service

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, NewBook, UpdateBook},
    repository::LibraryStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn LibraryStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self { store }
    }

    /// Register a new book; all its copies start available
    pub async fn register(&self, book: NewBook) -> AppResult<Book> {
        let book = book.normalized();
        book.validate()?;

        let created = self.store.books_create(&book).await?;
        tracing::info!(
            "Catalog: registered book id={} '{}' ({} copies)",
            created.id,
            created.title,
            created.total_copies
        );
        Ok(created)
    }

    /// Edit a book's descriptive fields and total copies
    pub async fn update(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        let update = update.normalized();
        update.validate()?;

        let updated = self.store.books_update(id, &update).await?;
        tracing::info!(
            "Catalog: updated book id={} ({}/{} available)",
            id,
            updated.available_copies,
            updated.total_copies
        );
        Ok(updated)
    }

    /// Remove a book with its whole loan history. Absent ids are a no-op.
    pub async fn remove(&self, id: i32) -> AppResult<()> {
        if self.store.books_delete(id).await? {
            tracing::info!("Catalog: removed book id={} and its loans", id);
        } else {
            tracing::debug!("Catalog: remove of unknown book id={} ignored", id);
        }
        Ok(())
    }

    /// Find books; a blank query lists the whole catalog
    pub async fn find(&self, query: Option<&str>) -> AppResult<Vec<Book>> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        self.store.books_search(query.map(str::to_string)).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<Book>> {
        self.store.books_get(id).await
    }

    /// Like [`get`](Self::get) but absence is an error
    pub async fn require(&self, id: i32) -> AppResult<Book> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }
}
