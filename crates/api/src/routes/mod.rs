//! API route definitions.

use axum::http::StatusCode;
use axum::{Json, Router};
use serde_json::{json, Value};

use kasdes_db::RepositoryError;

use crate::AppState;

pub mod dashboard;
pub mod health;
pub mod reports;
pub mod tariffs;
pub mod transactions;
pub mod units;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(units::routes())
        .merge(tariffs::routes())
        .merge(transactions::routes())
        .merge(reports::routes())
        .merge(dashboard::routes())
}

/// Maps a repository error to an HTTP error response.
///
/// Server-side failures are logged with full detail and surfaced with a
/// masked message; client errors carry the specific reason verbatim.
pub(crate) fn error_response(err: &RepositoryError) -> (StatusCode, Json<Value>) {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.public_message(),
        })),
    )
}
