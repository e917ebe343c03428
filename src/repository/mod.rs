//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    inventory::LendingPolicy,
    models::{Book, CatalogStats, CreateLoan, Loan, LoanDetails, NewBook, UpdateBook},
};

pub use memory::MemoryStore;

/// Persistence boundary used by the services.
///
/// Implementations must run each loan open/return and each book update as one
/// atomic unit that excludes concurrent writers on the same book.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Connectivity probe
    async fn ping(&self) -> AppResult<()>;

    async fn books_create(&self, book: &NewBook) -> AppResult<Book>;
    async fn books_get(&self, id: i32) -> AppResult<Option<Book>>;
    /// All books ordered by title, filtered when `query` is set
    async fn books_search(&self, query: Option<String>) -> AppResult<Vec<Book>>;
    async fn books_update(&self, id: i32, update: &UpdateBook) -> AppResult<Book>;
    /// Delete a book and its loans; `false` when nothing was there
    async fn books_delete(&self, id: i32) -> AppResult<bool>;

    async fn loans_get(&self, id: i32) -> AppResult<Option<Loan>>;
    async fn loans_open(&self, loan: &CreateLoan, policy: LendingPolicy) -> AppResult<Loan>;
    async fn loans_return(&self, id: i32, returned_on: NaiveDate) -> AppResult<Loan>;
    /// Open loans by due date, restricted to `due_date < due_before` when set
    async fn loans_list_open(&self, due_before: Option<NaiveDate>) -> AppResult<Vec<LoanDetails>>;
    /// Loans of one book with `loan_date >= since`, newest first
    async fn loans_history(&self, book_id: i32, since: NaiveDate) -> AppResult<Vec<Loan>>;

    async fn stats(&self, as_of: NaiveDate) -> AppResult<CatalogStats>;
}

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl LibraryStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn books_create(&self, book: &NewBook) -> AppResult<Book> {
        self.books.create(book).await
    }

    async fn books_get(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.get_by_id(id).await
    }

    async fn books_search(&self, query: Option<String>) -> AppResult<Vec<Book>> {
        self.books.search(query.as_deref()).await
    }

    async fn books_update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        self.books.update(id, update).await
    }

    async fn books_delete(&self, id: i32) -> AppResult<bool> {
        self.books.delete(id).await
    }

    async fn loans_get(&self, id: i32) -> AppResult<Option<Loan>> {
        self.loans.get_by_id(id).await
    }

    async fn loans_open(&self, loan: &CreateLoan, policy: LendingPolicy) -> AppResult<Loan> {
        self.loans.create(loan, policy).await
    }

    async fn loans_return(&self, id: i32, returned_on: NaiveDate) -> AppResult<Loan> {
        self.loans.return_loan(id, returned_on).await
    }

    async fn loans_list_open(&self, due_before: Option<NaiveDate>) -> AppResult<Vec<LoanDetails>> {
        self.loans.list_open(due_before).await
    }

    async fn loans_history(&self, book_id: i32, since: NaiveDate) -> AppResult<Vec<Loan>> {
        self.loans.history(book_id, since).await
    }

    async fn stats(&self, as_of: NaiveDate) -> AppResult<CatalogStats> {
        self.loans.stats(as_of).await
    }
}
