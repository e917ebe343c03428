//! Inventory coordination between books and loans.
//!
//! A book's `available_copies` must equal `total_copies` minus its open loans.
//! Every store calls these functions, inside its own critical section, whenever
//! a loan is opened or returned or a book's copy count is edited. Nothing else
//! may write `available_copies`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::book::Book,
};

/// How many open loans a single book may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LendingPolicy {
    /// Several open loans at once, bounded by available copies
    #[default]
    CopyCount,
    /// At most one open loan per book regardless of copies
    SingleCopy,
}

/// Take one copy of `book` out of the shelf for a new loan.
pub fn reserve(book: &mut Book, open_loans: i64, policy: LendingPolicy) -> AppResult<()> {
    if policy == LendingPolicy::SingleCopy && open_loans > 0 {
        return Err(AppError::Conflict(format!(
            "Book {} already has an open loan",
            book.id
        )));
    }
    if book.available_copies <= 0 {
        return Err(AppError::Unavailable(format!(
            "No copies of book {} are available",
            book.id
        )));
    }
    book.available_copies -= 1;
    Ok(())
}

/// Put one copy of `book` back on the shelf after a return.
pub fn release(book: &mut Book) {
    if book.available_copies < book.total_copies {
        book.available_copies += 1;
    } else {
        tracing::warn!(
            "Book {} returned with all {} copies already available",
            book.id,
            book.total_copies
        );
    }
}

/// Available copies implied by a total and the number of open loans.
pub fn recompute_available(total_copies: i32, open_loans: i64) -> AppResult<i32> {
    let open = i32::try_from(open_loans)
        .map_err(|_| AppError::Internal(format!("Open loan count {} out of range", open_loans)))?;
    if total_copies < open {
        return Err(AppError::Validation(format!(
            "Total copies ({}) cannot be lower than the {} copies currently on loan",
            total_copies, open
        )));
    }
    Ok(total_copies - open)
}

/// Strictly earlier than the reference date; a loan due today is not overdue.
pub fn is_overdue(due_date: NaiveDate, as_of: NaiveDate) -> bool {
    due_date < as_of
}
