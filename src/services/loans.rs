//! Loan management service

use std::sync::Arc;

use chrono::{Duration, NaiveDate};

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    inventory,
    models::{
        book::non_empty,
        dates,
        loan::{CreateLoan, Loan, LoanDetails},
    },
    repository::LibraryStore,
};

/// Loan request as received from a caller; dates may be left to defaults
#[derive(Debug, Clone, Default)]
pub struct LoanRequest {
    pub book_id: i32,
    pub borrower: String,
    pub borrower_group: Option<String>,
    pub loan_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct LoansService {
    store: Arc<dyn LibraryStore>,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(store: Arc<dyn LibraryStore>, config: LoansConfig) -> Self {
        Self { store, config }
    }

    /// Lend a copy of a book
    pub async fn open(&self, request: LoanRequest) -> AppResult<Loan> {
        let borrower = request.borrower.trim().to_string();
        if borrower.is_empty() {
            return Err(AppError::Validation("Borrower name is required".to_string()));
        }

        let loan_date = request.loan_date.unwrap_or_else(dates::today);
        let due_date = match request.due_date {
            Some(due) => due,
            None => Duration::try_days(self.config.default_duration_days)
                .and_then(|period| loan_date.checked_add_signed(period))
                .ok_or_else(|| {
                    AppError::Validation("Default loan period is out of range".to_string())
                })?,
        };
        if due_date < loan_date {
            return Err(AppError::Validation(format!(
                "Due date {} is before loan date {}",
                dates::display_date(Some(due_date)),
                dates::display_date(Some(loan_date))
            )));
        }

        let loan = CreateLoan {
            book_id: request.book_id,
            borrower,
            borrower_group: non_empty(request.borrower_group),
            loan_date,
            due_date,
        };

        match self.store.loans_open(&loan, self.config.policy).await {
            Ok(created) => {
                tracing::info!(
                    "Loan {} opened: book={} borrower='{}' due={}",
                    created.id,
                    created.book_id,
                    created.borrower,
                    created.due_date
                );
                Ok(created)
            }
            Err(e) => {
                if !e.is_infrastructure() {
                    tracing::warn!("Loan refused for book {}: {}", loan.book_id, e);
                }
                Err(e)
            }
        }
    }

    /// Return a lent copy; the loan closes with today's date
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<Loan> {
        let loan = self.store.loans_return(loan_id, dates::today()).await?;
        tracing::info!("Loan {} returned: book={}", loan.id, loan.book_id);
        Ok(loan)
    }

    pub async fn get(&self, loan_id: i32) -> AppResult<Loan> {
        self.store
            .loans_get(loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", loan_id)))
    }

    /// All open loans, earliest due first, flagged against today
    pub async fn list_open(&self) -> AppResult<Vec<LoanDetails>> {
        let today = dates::today();
        let mut loans = self.store.loans_list_open(None).await?;
        for loan in &mut loans {
            loan.is_overdue = inventory::is_overdue(loan.loan.due_date, today);
        }
        Ok(loans)
    }

    /// Open loans due strictly before `as_of` (today by default)
    pub async fn list_overdue(&self, as_of: Option<NaiveDate>) -> AppResult<Vec<LoanDetails>> {
        let as_of = as_of.unwrap_or_else(dates::today);
        let mut loans = self.store.loans_list_open(Some(as_of)).await?;
        for loan in &mut loans {
            loan.is_overdue = true;
        }
        Ok(loans)
    }

    /// Loans of a book within the last `window_days` (configured default when absent)
    pub async fn history(&self, book_id: i32, window_days: Option<i64>) -> AppResult<Vec<Loan>> {
        let window = window_days.unwrap_or(self.config.history_window_days);
        if window < 0 {
            return Err(AppError::Validation(
                "History window must not be negative".to_string(),
            ));
        }

        if self.store.books_get(book_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Book {} not found", book_id)));
        }

        // A window reaching past the calendar start covers every loan
        let since = Duration::try_days(window)
            .and_then(|span| dates::today().checked_sub_signed(span))
            .map_or_else(dates::earliest, |since| since.max(dates::earliest()));
        self.store.loans_history(book_id, since).await
    }
}
