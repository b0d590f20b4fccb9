//! Transaction routes: recording, editing, deleting, and listing.
//!
//! Recording writes the source transaction and its paired ledger entry
//! atomically; edits and deletes cascade through the unit's chain inside
//! the repository.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use kasdes_db::repositories::{TransactionFilter, UpdateExpenseInput, UpdateIncomeInput};
use kasdes_core::ledger::{ExpenseInput, IncomeInput};
use kasdes_shared::types::{ExpenseId, IncomeId, PageRequest, UnitId};

use super::error_response;
use crate::AppState;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/units/{unit_id}/income",
            get(list_income).post(record_income),
        )
        .route(
            "/units/{unit_id}/expenses",
            get(list_expenses).post(record_expense),
        )
        .route("/income/{income_id}", patch(edit_income).delete(delete_income))
        .route(
            "/expenses/{expense_id}",
            patch(edit_expense).delete(delete_expense),
        )
}

/// Request body for recording an income transaction.
#[derive(Debug, Deserialize)]
pub struct RecordIncomeRequest {
    /// Tenant or payer name.
    pub tenant: String,
    /// Tariff category.
    pub category: String,
    /// Quantity in the tariff's unit of measure.
    pub quantity: Decimal,
    /// Optional note.
    pub note: Option<String>,
    /// When the rental/usage happened; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Request body for recording an expense transaction.
#[derive(Debug, Deserialize)]
pub struct RecordExpenseRequest {
    /// Expense category.
    pub category: String,
    /// What the money was spent on.
    pub description: String,
    /// Amount spent.
    pub amount: Decimal,
    /// When the expense happened; defaults to now.
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Request body for editing an income transaction.
#[derive(Debug, Deserialize, Default)]
pub struct EditIncomeRequest {
    /// New tenant name.
    pub tenant: Option<String>,
    /// New quantity.
    pub quantity: Option<Decimal>,
    /// New note.
    pub note: Option<String>,
}

/// Request body for editing an expense transaction.
#[derive(Debug, Deserialize, Default)]
pub struct EditExpenseRequest {
    /// New category.
    pub category: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
}

/// Date-range query parameters for transaction listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Only transactions on or after this date.
    pub from: Option<NaiveDate>,
    /// Only transactions on or before this date.
    pub to: Option<NaiveDate>,
}

impl ListQuery {
    /// Converts the calendar-day bounds to a half-open UTC interval.
    fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            from: self
                .from
                .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))),
            to: self
                .to
                .and_then(|d| d.succ_opt())
                .map(|d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))),
        }
    }
}

async fn record_income(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Json(request): Json<RecordIncomeRequest>,
) -> impl IntoResponse {
    let input = IncomeInput {
        unit_id: UnitId::from_uuid(unit_id),
        tenant: request.tenant,
        category: request.category,
        quantity: request.quantity,
        note: request.note,
        occurred_at: request.occurred_at.unwrap_or_else(Utc::now),
    };
    match state.ledger().record_income(input).await {
        Ok(recorded) => (
            StatusCode::CREATED,
            Json(json!({
                "income": recorded.income,
                "entry": recorded.entry,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn record_expense(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Json(request): Json<RecordExpenseRequest>,
) -> impl IntoResponse {
    let input = ExpenseInput {
        unit_id: UnitId::from_uuid(unit_id),
        category: request.category,
        description: request.description,
        amount: request.amount,
        occurred_at: request.occurred_at.unwrap_or_else(Utc::now),
    };
    match state.ledger().record_expense(input).await {
        Ok(recorded) => (
            StatusCode::CREATED,
            Json(json!({
                "expense": recorded.expense,
                "entry": recorded.entry,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn edit_income(
    State(state): State<AppState>,
    Path(income_id): Path<Uuid>,
    Json(request): Json<EditIncomeRequest>,
) -> impl IntoResponse {
    let update = UpdateIncomeInput {
        tenant: request.tenant,
        quantity: request.quantity,
        note: request.note,
    };
    match state
        .ledger()
        .edit_income(IncomeId::from_uuid(income_id), update)
        .await
    {
        Ok(recorded) => (
            StatusCode::OK,
            Json(json!({
                "income": recorded.income,
                "entry": recorded.entry,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn edit_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
    Json(request): Json<EditExpenseRequest>,
) -> impl IntoResponse {
    let update = UpdateExpenseInput {
        category: request.category,
        description: request.description,
        amount: request.amount,
    };
    match state
        .ledger()
        .edit_expense(ExpenseId::from_uuid(expense_id), update)
        .await
    {
        Ok(recorded) => (
            StatusCode::OK,
            Json(json!({
                "expense": recorded.expense,
                "entry": recorded.entry,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn delete_income(
    State(state): State<AppState>,
    Path(income_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .ledger()
        .delete_income(IncomeId::from_uuid(income_id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn delete_expense(
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
) -> impl IntoResponse {
    match state
        .ledger()
        .delete_expense(ExpenseId::from_uuid(expense_id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn list_income(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state
        .ledger()
        .list_income(UnitId::from_uuid(unit_id), query.filter(), &page)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn list_expenses(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    match state
        .ledger()
        .list_expense(UnitId::from_uuid(unit_id), query.filter(), &page)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_bounds_are_half_open() {
        let query = ListQuery {
            from: NaiveDate::from_ymd_opt(2026, 8, 1),
            to: NaiveDate::from_ymd_opt(2026, 8, 31),
        };
        let filter = query.filter();
        assert_eq!(
            filter.from.unwrap().to_rfc3339(),
            "2026-08-01T00:00:00+00:00"
        );
        // The inclusive end date becomes an exclusive next-day bound.
        assert_eq!(filter.to.unwrap().to_rfc3339(), "2026-09-01T00:00:00+00:00");
    }

    #[test]
    fn test_list_query_defaults_to_unbounded() {
        let query = ListQuery { from: None, to: None };
        let filter = query.filter();
        assert!(filter.from.is_none());
        assert!(filter.to.is_none());
    }
}
