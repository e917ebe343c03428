//! Data models for Bibliotheca

pub mod book;
pub mod dates;
pub mod loan;

// Re-export commonly used types
pub use book::{Book, BookQuery, NewBook, UpdateBook};
pub use loan::{CatalogStats, CreateLoan, Loan, LoanDetails, LoanStatus};
