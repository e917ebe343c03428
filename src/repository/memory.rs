//! In-process store for development and tests.
//!
//! Everything lives behind one async mutex, held for the whole of each
//! operation, so every operation is a single-writer critical section.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use super::LibraryStore;
use crate::{
    error::{AppError, AppResult},
    inventory::{self, LendingPolicy},
    models::{Book, CatalogStats, CreateLoan, Loan, LoanDetails, LoanStatus, NewBook, UpdateBook},
};

#[derive(Debug, Default)]
struct State {
    books: BTreeMap<i32, Book>,
    loans: BTreeMap<i32, Loan>,
    last_book_id: i32,
    last_loan_id: i32,
}

impl State {
    fn open_loans_on(&self, book_id: i32) -> i64 {
        self.loans
            .values()
            .filter(|l| l.book_id == book_id && l.is_open())
            .count() as i64
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn books_create(&self, book: &NewBook) -> AppResult<Book> {
        let mut state = self.state.lock().await;

        let id = match book.id {
            Some(id) if state.books.contains_key(&id) => {
                return Err(AppError::DuplicateId(format!(
                    "A book with id {} already exists",
                    id
                )));
            }
            Some(id) => id,
            None => state.last_book_id + 1,
        };
        state.last_book_id = state.last_book_id.max(id);

        let created = Book {
            id,
            title: book.title.clone(),
            author: book.author.clone(),
            publisher: book.publisher.clone(),
            shelf: book.shelf.clone(),
            year: book.year,
            isbn: book.isbn.clone(),
            note: book.note.clone(),
            total_copies: book.total_copies,
            available_copies: book.total_copies,
        };
        state.books.insert(id, created.clone());
        Ok(created)
    }

    async fn books_get(&self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.state.lock().await.books.get(&id).cloned())
    }

    async fn books_search(&self, query: Option<String>) -> AppResult<Vec<Book>> {
        let state = self.state.lock().await;
        let needle = query.map(|q| q.to_lowercase());

        let mut books: Vec<Book> = state
            .books
            .values()
            .filter(|b| needle.as_deref().map_or(true, |n| b.matches(n)))
            .cloned()
            .collect();
        books.sort_by_cached_key(|b| (b.title.to_lowercase(), b.id));
        Ok(books)
    }

    async fn books_update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let mut state = self.state.lock().await;
        let open_loans = state.open_loans_on(id);

        let current = state
            .books
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        let mut book = current.clone();
        book.apply_update(update);
        book.available_copies = inventory::recompute_available(book.total_copies, open_loans)?;

        state.books.insert(id, book.clone());
        Ok(book)
    }

    async fn books_delete(&self, id: i32) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.books.remove(&id).is_none() {
            return Ok(false);
        }
        state.loans.retain(|_, l| l.book_id != id);
        Ok(true)
    }

    async fn loans_get(&self, id: i32) -> AppResult<Option<Loan>> {
        Ok(self.state.lock().await.loans.get(&id).cloned())
    }

    async fn loans_open(&self, loan: &CreateLoan, policy: LendingPolicy) -> AppResult<Loan> {
        let mut state = self.state.lock().await;
        let open_loans = state.open_loans_on(loan.book_id);

        let mut book = state
            .books
            .get(&loan.book_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", loan.book_id)))?;

        inventory::reserve(&mut book, open_loans, policy)?;

        let id = state.last_loan_id + 1;
        state.last_loan_id = id;

        let created = Loan {
            id,
            book_id: loan.book_id,
            borrower: loan.borrower.clone(),
            borrower_group: loan.borrower_group.clone(),
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: None,
            status: LoanStatus::Open,
        };
        state.loans.insert(id, created.clone());
        state.books.insert(book.id, book);
        Ok(created)
    }

    async fn loans_return(&self, id: i32, returned_on: NaiveDate) -> AppResult<Loan> {
        let mut state = self.state.lock().await;

        let mut loan = state
            .loans
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))?;
        loan.mark_returned(returned_on)?;

        let book = state
            .books
            .get_mut(&loan.book_id)
            .ok_or_else(|| AppError::Internal(format!("Loan {} references a missing book", id)))?;
        inventory::release(book);

        state.loans.insert(id, loan.clone());
        Ok(loan)
    }

    async fn loans_list_open(&self, due_before: Option<NaiveDate>) -> AppResult<Vec<LoanDetails>> {
        let state = self.state.lock().await;

        let mut loans: Vec<LoanDetails> = state
            .loans
            .values()
            .filter(|l| l.is_open())
            .filter(|l| due_before.map_or(true, |d| l.due_date < d))
            .filter_map(|l| {
                state.books.get(&l.book_id).map(|b| LoanDetails {
                    loan: l.clone(),
                    book_title: b.title.clone(),
                    book_shelf: b.shelf.clone(),
                    is_overdue: false,
                })
            })
            .collect();
        loans.sort_by(|a, b| {
            a.loan
                .due_date
                .cmp(&b.loan.due_date)
                .then(a.loan.id.cmp(&b.loan.id))
        });
        Ok(loans)
    }

    async fn loans_history(&self, book_id: i32, since: NaiveDate) -> AppResult<Vec<Loan>> {
        let state = self.state.lock().await;

        let mut loans: Vec<Loan> = state
            .loans
            .values()
            .filter(|l| l.book_id == book_id && l.loan_date >= since)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.loan_date.cmp(&a.loan_date).then(b.id.cmp(&a.id)));
        Ok(loans)
    }

    async fn stats(&self, as_of: NaiveDate) -> AppResult<CatalogStats> {
        let state = self.state.lock().await;
        let open = state.loans.values().filter(|l| l.is_open());

        Ok(CatalogStats {
            total_books: state.books.len() as i64,
            total_copies: state.books.values().map(|b| b.total_copies as i64).sum(),
            available_copies: state.books.values().map(|b| b.available_copies as i64).sum(),
            open_loans: open.clone().count() as i64,
            overdue_loans: open
                .filter(|l| inventory::is_overdue(l.due_date, as_of))
                .count() as i64,
        })
    }
}
