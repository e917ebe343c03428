//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        dates,
        loan::{Loan, LoanDetails},
    },
    services::loans::LoanRequest,
    AppState,
};

use super::DateDisplay;

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Book to lend
    pub book_id: i32,
    /// Borrower name
    pub borrower: String,
    /// Borrower group or class
    pub borrower_group: Option<String>,
    /// Loan date, `dd/mm/yyyy` or `yyyy-mm-dd` (default: today)
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    #[schema(value_type = Option<String>, example = "10/01/2025")]
    pub loan_date: Option<NaiveDate>,
    /// Due date, `dd/mm/yyyy` or `yyyy-mm-dd` (default: loan date plus the configured period)
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    #[schema(value_type = Option<String>, example = "24/01/2025")]
    pub due_date: Option<NaiveDate>,
}

/// Overdue report reference date
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverdueQuery {
    /// Reference date, `dd/mm/yyyy` or `yyyy-mm-dd` (default: today)
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    #[param(value_type = Option<String>)]
    pub as_of: Option<NaiveDate>,
}

/// Loan with display-formatted dates
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanResponse {
    #[serde(flatten)]
    pub loan: Loan,
    pub display: DateDisplay,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        let display = DateDisplay::new(loan.loan_date, loan.due_date, loan.return_date);
        Self { loan, display }
    }
}

/// Open loan with its book and display-formatted dates
#[derive(Debug, Serialize, ToSchema)]
pub struct LoanDetailsResponse {
    #[serde(flatten)]
    pub details: LoanDetails,
    pub display: DateDisplay,
}

impl From<LoanDetails> for LoanDetailsResponse {
    fn from(details: LoanDetails) -> Self {
        let display = DateDisplay::new(
            details.loan.loan_date,
            details.loan.due_date,
            details.loan.return_date,
        );
        Self { details, display }
    }
}

/// Return response with loan details
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Closed loan
    pub loan: LoanResponse,
}

/// List open loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "Open loans, earliest due first", body = Vec<LoanDetailsResponse>)
    )
)]
pub async fn list_open_loans(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<LoanDetailsResponse>>> {
    let loans = state.services.loans.list_open().await?;
    Ok(Json(loans.into_iter().map(LoanDetailsResponse::from).collect()))
}

/// List overdue loans
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    params(OverdueQuery),
    responses(
        (status = 200, description = "Open loans due before the reference date", body = Vec<LoanDetailsResponse>),
        (status = 400, description = "Invalid date")
    )
)]
pub async fn list_overdue_loans(
    State(state): State<AppState>,
    Query(query): Query<OverdueQuery>,
) -> AppResult<Json<Vec<LoanDetailsResponse>>> {
    let loans = state.services.loans.list_overdue(query.as_of).await?;
    Ok(Json(loans.into_iter().map(LoanDetailsResponse::from).collect()))
}

/// Get a loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanResponse),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.loans.get(loan_id).await?;
    Ok(Json(loan.into()))
}

/// Create a new loan (lend a copy)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book already lent or no copies available")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    let loan = state
        .services
        .loans
        .open(LoanRequest {
            book_id: request.book_id,
            borrower: request.borrower,
            borrower_group: request.borrower_group,
            loan_date: request.loan_date,
            due_date: request.due_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(loan.into())))
}

/// Return a lent copy
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Copy returned", body = ReturnResponse),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let loan = state.services.loans.return_loan(loan_id).await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        loan: loan.into(),
    }))
}
