//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use super::books::{count_open_loans, lock_book, store_available};
use crate::{
    error::{AppError, AppResult},
    inventory::{self, LendingPolicy},
    models::loan::{CatalogStats, CreateLoan, Loan, LoanDetails, LoanStatus},
};

const LOAN_COLUMNS: &str =
    "id, book_id, borrower, borrower_group, loan_date, due_date, return_date, status";

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {} FROM loans WHERE id = $1",
            LOAN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Open a loan and take a copy, holding the book row lock throughout
    pub async fn create(&self, loan: &CreateLoan, policy: LendingPolicy) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let mut book = lock_book(&mut tx, loan.book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", loan.book_id)))?;
        let open_loans = count_open_loans(&mut tx, book.id).await?;

        inventory::reserve(&mut book, open_loans, policy)?;

        let created = sqlx::query_as::<_, Loan>(&format!(
            r#"
            INSERT INTO loans (book_id, borrower, borrower_group, loan_date, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            LOAN_COLUMNS
        ))
        .bind(loan.book_id)
        .bind(&loan.borrower)
        .bind(&loan.borrower_group)
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(LoanStatus::Open.as_str())
        .fetch_one(&mut *tx)
        .await?;

        store_available(&mut tx, &book).await?;

        tx.commit().await?;
        Ok(created)
    }

    /// Close a loan and give its copy back.
    ///
    /// The loan is read once unlocked to learn its book, then the book row is
    /// locked before the loan row so every writer takes locks in the same order.
    pub async fn return_loan(&self, loan_id: i32, returned_on: NaiveDate) -> AppResult<Loan> {
        let not_found = || AppError::NotFound(format!("Loan {} not found", loan_id));

        let book_id: i32 = sqlx::query_scalar("SELECT book_id FROM loans WHERE id = $1")
            .bind(loan_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)?;

        let mut tx = self.pool.begin().await?;

        let mut book = lock_book(&mut tx, book_id).await?.ok_or_else(not_found)?;

        let mut loan = sqlx::query_as::<_, Loan>(&format!(
            "SELECT {} FROM loans WHERE id = $1 FOR UPDATE",
            LOAN_COLUMNS
        ))
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;

        loan.mark_returned(returned_on)?;

        sqlx::query("UPDATE loans SET status = $1, return_date = $2 WHERE id = $3")
            .bind(loan.status.as_str())
            .bind(loan.return_date)
            .bind(loan.id)
            .execute(&mut *tx)
            .await?;

        inventory::release(&mut book);
        store_available(&mut tx, &book).await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Open loans joined with their book, ordered by due date
    pub async fn list_open(&self, due_before: Option<NaiveDate>) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.id, l.book_id, l.borrower, l.borrower_group, l.loan_date, l.due_date,
                   l.return_date, l.status,
                   b.title AS book_title, b.shelf AS book_shelf
            FROM loans l
            JOIN books b ON b.id = l.book_id
            WHERE l.status = 'OPEN'
              AND ($1::date IS NULL OR l.due_date < $1::date)
            ORDER BY l.due_date, l.id
            "#,
        )
        .bind(due_before)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Loans of a book starting on or after `since`, newest first
    pub async fn history(&self, book_id: i32, since: NaiveDate) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(&format!(
            r#"
            SELECT {} FROM loans
            WHERE book_id = $1 AND loan_date >= $2
            ORDER BY loan_date DESC, id DESC
            "#,
            LOAN_COLUMNS
        ))
        .bind(book_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// Dashboard counters
    pub async fn stats(&self, as_of: NaiveDate) -> AppResult<CatalogStats> {
        let stats = sqlx::query_as::<_, CatalogStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books) AS total_books,
                (SELECT COALESCE(SUM(total_copies), 0)::bigint FROM books) AS total_copies,
                (SELECT COALESCE(SUM(available_copies), 0)::bigint FROM books) AS available_copies,
                (SELECT COUNT(*) FROM loans WHERE status = 'OPEN') AS open_loans,
                (SELECT COUNT(*) FROM loans WHERE status = 'OPEN' AND due_date < $1) AS overdue_loans
            "#,
        )
        .bind(as_of)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
