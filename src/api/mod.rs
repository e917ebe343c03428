//! API handlers for Bibliotheca REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{models::dates, AppState};

/// Dates of a loan formatted for display (`dd/mm/yyyy`, `-` when absent)
#[derive(Debug, Serialize, ToSchema)]
pub struct DateDisplay {
    pub loan_date: String,
    pub due_date: String,
    pub return_date: String,
}

impl DateDisplay {
    pub fn new(loan_date: NaiveDate, due_date: NaiveDate, return_date: Option<NaiveDate>) -> Self {
        Self {
            loan_date: dates::display_date(Some(loan_date)),
            due_date: dates::display_date(Some(due_date)),
            return_date: dates::display_date(return_date),
        }
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/loans", get(books::book_history))
        // Loans
        .route("/loans", get(loans::list_open_loans).post(loans::create_loan))
        .route("/loans/overdue", get(loans::list_overdue_loans))
        .route("/loans/:id", get(loans::get_loan))
        .route("/loans/:id/return", post(loans::return_loan))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
