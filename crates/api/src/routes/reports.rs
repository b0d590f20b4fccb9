//! Report routes: monthly summaries and daily detail.
//!
//! Reports are computed from the ledger chain and served through the
//! aggregate cache; a stale copy is returned when a fresh computation
//! fails.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use kasdes_shared::types::{PageRequest, PageResponse, UnitId};

use super::error_response;
use crate::AppState;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/units/{unit_id}/reports/monthly-summary",
            get(monthly_summary),
        )
        .route("/units/{unit_id}/reports/daily-detail", get(daily_detail))
}

/// Query parameters for the daily detail report.
#[derive(Debug, Deserialize)]
pub struct DailyDetailQuery {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

async fn monthly_summary(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let summary = match state
        .reports()
        .monthly_summary(UnitId::from_uuid(unit_id))
        .await
    {
        Ok(summary) => summary,
        Err(err) => return error_response(&err).into_response(),
    };

    // The summary is cached whole; pagination slices the month rows here
    // so every page is served from the same computation.
    let total = summary.months.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let months: Vec<_> = summary
        .months
        .iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "unit_id": summary.unit_id,
            "totals": summary.totals,
            "months": PageResponse::new(months, &page, total),
        })),
    )
        .into_response()
}

async fn daily_detail(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Query(query): Query<DailyDetailQuery>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    if !(1..=12).contains(&query.month) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "INVALID_MONTH",
                "message": "Month must be between 1 and 12",
            })),
        )
            .into_response();
    }

    let detail = match state
        .reports()
        .daily_detail(UnitId::from_uuid(unit_id), query.year, query.month)
        .await
    {
        Ok(detail) => detail,
        Err(err) => return error_response(&err).into_response(),
    };

    let total = detail.rows.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let rows: Vec<_> = detail
        .rows
        .iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "unit_id": detail.unit_id,
            "year": detail.year,
            "month": detail.month,
            "totals": detail.totals,
            "rows": PageResponse::new(rows, &page, total),
        })),
    )
        .into_response()
}
