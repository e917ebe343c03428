//! Statistics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{dates, loan::CatalogStats},
    AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Reference date for the overdue count (default: today)
    #[serde(default, deserialize_with = "dates::flexible::deserialize")]
    #[param(value_type = Option<String>)]
    pub as_of: Option<NaiveDate>,
}

/// Catalog and loan counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Dashboard counters", body = CatalogStats)
    )
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<Json<CatalogStats>> {
    let stats = state.services.stats.summary(query.as_of).await?;
    Ok(Json(stats))
}
