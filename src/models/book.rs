//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book record from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    /// Shelf location
    pub shelf: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub note: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl Book {
    /// Case-insensitive substring match over id, title, author, isbn and shelf.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        if self.id.to_string().contains(needle) || self.title.to_lowercase().contains(needle) {
            return true;
        }
        [&self.author, &self.isbn, &self.shelf]
            .into_iter()
            .flatten()
            .any(|v| v.to_lowercase().contains(needle))
    }

    /// Overwrite descriptive fields present in `update`. An empty string clears
    /// an optional field. Copy counts are left to the inventory module.
    pub fn apply_update(&mut self, update: &UpdateBook) {
        if let Some(ref title) = update.title {
            self.title = title.trim().to_string();
        }
        overwrite(&mut self.author, &update.author);
        overwrite(&mut self.publisher, &update.publisher);
        overwrite(&mut self.shelf, &update.shelf);
        overwrite(&mut self.isbn, &update.isbn);
        overwrite(&mut self.note, &update.note);
        if update.year.is_some() {
            self.year = update.year;
        }
        if let Some(total) = update.total_copies {
            self.total_copies = total;
        }
    }
}

fn overwrite(field: &mut Option<String>, value: &Option<String>) {
    if let Some(v) = value {
        *field = non_empty(Some(v.clone()));
    }
}

/// Trim, and collapse blank strings to `None`
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Register book request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct NewBook {
    /// Caller-supplied id; generated when absent
    pub id: Option<i32>,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub shelf: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub note: Option<String>,
    #[validate(range(min = 1, message = "Total copies must be a positive integer"))]
    pub total_copies: i32,
}

impl NewBook {
    pub fn normalized(self) -> Self {
        Self {
            id: self.id,
            title: self.title.trim().to_string(),
            author: non_empty(self.author),
            publisher: non_empty(self.publisher),
            shelf: non_empty(self.shelf),
            year: self.year,
            isbn: non_empty(self.isbn),
            note: non_empty(self.note),
            total_copies: self.total_copies,
        }
    }
}

/// Update book request. Absent fields are kept; available copies are always
/// derived from the number of open loans.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub shelf: Option<String>,
    pub year: Option<i32>,
    pub isbn: Option<String>,
    pub note: Option<String>,
    #[validate(range(min = 1, message = "Total copies must be a positive integer"))]
    pub total_copies: Option<i32>,
}

impl UpdateBook {
    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self
    }
}

/// Book search query
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Free text matched against id, title, author, ISBN and shelf
    pub q: Option<String>,
}
