//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Loan status, stored as `OPEN` / `RETURNED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Open,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Open => "OPEN",
            LoanStatus::Returned => "RETURNED",
        }
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "OPEN" => Ok(LoanStatus::Open),
            "RETURNED" => Ok(LoanStatus::Returned),
            other => Err(AppError::Internal(format!("Unknown loan status {}", other))),
        }
    }
}

/// Loan model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub borrower: String,
    /// Borrower group or class label
    pub borrower_group: Option<String>,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.status == LoanStatus::Open
    }

    /// Close the loan. Status and return date change together.
    pub fn mark_returned(&mut self, returned_on: NaiveDate) -> AppResult<()> {
        if !self.is_open() {
            return Err(AppError::AlreadyReturned(format!(
                "Loan {} has already been returned",
                self.id
            )));
        }
        self.status = LoanStatus::Returned;
        self.return_date = Some(returned_on);
        Ok(())
    }
}

/// Open loan joined with the book it references
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub loan: Loan,
    pub book_title: String,
    pub book_shelf: Option<String>,
    #[sqlx(skip)]
    pub is_overdue: bool,
}

/// Fully resolved loan to be opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLoan {
    pub book_id: i32,
    pub borrower: String,
    pub borrower_group: Option<String>,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CatalogStats {
    pub total_books: i64,
    pub total_copies: i64,
    pub available_copies: i64,
    pub open_loans: i64,
    pub overdue_loans: i64,
}
