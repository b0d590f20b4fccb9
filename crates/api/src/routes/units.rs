//! Unit routes: setup, listing, and opening balance adjustment.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use kasdes_core::unit::UnitKind;
use kasdes_shared::types::{format_amount, UnitId};

use super::error_response;
use crate::AppState;

/// Creates the unit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/units", get(list_units).post(create_unit))
        .route("/units/{unit_id}", get(get_unit))
        .route("/units/{unit_id}/balance", get(get_balance))
        .route(
            "/units/{unit_id}/opening-balance",
            get(get_opening_balance).put(set_opening_balance),
        )
}

/// Request body for creating a unit.
#[derive(Debug, Deserialize)]
pub struct CreateUnitRequest {
    /// Display name.
    pub name: String,
    /// Kind of business line.
    pub kind: UnitKind,
    /// Opening balance the ledger chain hangs from.
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Request body for adjusting an opening balance.
#[derive(Debug, Deserialize)]
pub struct OpeningBalanceRequest {
    /// The new opening balance.
    pub amount: Decimal,
}

async fn create_unit(
    State(state): State<AppState>,
    Json(request): Json<CreateUnitRequest>,
) -> impl IntoResponse {
    match state
        .units()
        .create_unit(&request.name, request.kind, request.opening_balance)
        .await
    {
        Ok(unit) => (StatusCode::CREATED, Json(json!({ "unit": unit }))).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn list_units(State(state): State<AppState>) -> impl IntoResponse {
    match state.units().list_units().await {
        Ok(units) => (StatusCode::OK, Json(json!({ "units": units }))).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn get_unit(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
) -> impl IntoResponse {
    let unit_id = UnitId::from_uuid(unit_id);
    match state.units().get_unit(unit_id).await {
        Ok(unit) => (StatusCode::OK, Json(json!({ "unit": unit }))).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn get_balance(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
) -> impl IntoResponse {
    let unit_id = UnitId::from_uuid(unit_id);
    match state.ledger().current_balance(unit_id).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({
                "unit_id": unit_id,
                "balance": balance,
                "balance_formatted": format_amount(balance),
            })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn get_opening_balance(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
) -> impl IntoResponse {
    let unit_id = UnitId::from_uuid(unit_id);
    match state.units().get_opening_balance(unit_id).await {
        Ok(amount) => (
            StatusCode::OK,
            Json(json!({
                "unit_id": unit_id,
                "opening_balance": amount,
                "opening_balance_formatted": format_amount(amount),
            })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn set_opening_balance(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Json(request): Json<OpeningBalanceRequest>,
) -> impl IntoResponse {
    let unit_id = UnitId::from_uuid(unit_id);
    match state
        .units()
        .set_opening_balance(unit_id, request.amount)
        .await
    {
        Ok(amount) => (
            StatusCode::OK,
            Json(json!({
                "unit_id": unit_id,
                "opening_balance": amount,
            })),
        )
            .into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
