//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for units, tariffs, transactions, and reports
//! - Shared application state
//! - Error-to-response mapping

pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use kasdes_core::cache::AggregateCache;
use kasdes_db::{LedgerRepository, ReportRepository, TariffRepository, UnitRepository};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Aggregate cache shared by repositories.
    pub cache: Arc<AggregateCache>,
}

impl AppState {
    /// Creates the shared state.
    #[must_use]
    pub fn new(db: DatabaseConnection, cache: Arc<AggregateCache>) -> Self {
        Self { db, cache }
    }

    /// Unit repository bound to this state.
    #[must_use]
    pub fn units(&self) -> UnitRepository {
        UnitRepository::new(self.db.clone(), Arc::clone(&self.cache))
    }

    /// Tariff repository bound to this state.
    #[must_use]
    pub fn tariffs(&self) -> TariffRepository {
        TariffRepository::new(self.db.clone())
    }

    /// Ledger repository bound to this state.
    #[must_use]
    pub fn ledger(&self) -> LedgerRepository {
        LedgerRepository::new(self.db.clone(), Arc::clone(&self.cache))
    }

    /// Report repository bound to this state.
    #[must_use]
    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.db.clone(), Arc::clone(&self.cache))
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
