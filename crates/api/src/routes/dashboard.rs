//! Dashboard route: cross-unit rollup.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use super::error_response;
use crate::AppState;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    match state.reports().dashboard().await {
        Ok(summary) => (StatusCode::OK, Json(&*summary)).into_response(),
        Err(err) => error_response(&err).into_response(),
    }
}
