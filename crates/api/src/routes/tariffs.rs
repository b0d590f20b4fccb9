//! Tariff routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use kasdes_core::tariff::TariffInput;
use kasdes_shared::types::{TariffId, UnitId};

use super::error_response;
use crate::AppState;

/// Creates the tariff routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/units/{unit_id}/tariffs",
            get(list_tariffs).post(create_tariff),
        )
        .route("/tariffs/{tariff_id}", delete(delete_tariff))
}

/// Request body for creating a tariff.
#[derive(Debug, Deserialize)]
pub struct CreateTariffRequest {
    /// Category the tariff prices, e.g. "hourly_rental".
    pub category: String,
    /// Price per unit of measure.
    pub rate: Decimal,
    /// Unit of measure, e.g. "hour".
    pub unit_of_measure: String,
}

async fn create_tariff(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
    Json(request): Json<CreateTariffRequest>,
) -> impl IntoResponse {
    let input = TariffInput {
        unit_id: UnitId::from_uuid(unit_id),
        category: request.category,
        rate: request.rate,
        unit_of_measure: request.unit_of_measure,
    };
    match state.tariffs().create(input).await {
        Ok(tariff) => (StatusCode::CREATED, Json(json!({ "tariff": tariff }))).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn list_tariffs(
    State(state): State<AppState>,
    Path(unit_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.tariffs().list(UnitId::from_uuid(unit_id)).await {
        Ok(tariffs) => (StatusCode::OK, Json(json!({ "tariffs": tariffs }))).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}

async fn delete_tariff(
    State(state): State<AppState>,
    Path(tariff_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.tariffs().delete(TariffId::from_uuid(tariff_id)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
