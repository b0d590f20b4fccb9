//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! Every ledger mutation goes through [`LedgerRepository`], which owns the
//! chain invariant and the aggregate cache invalidation.

pub mod ledger;
pub mod report;
pub mod tariff;
pub mod unit;

pub use ledger::{
    LedgerRepository, RecordedExpense, RecordedIncome, TransactionFilter, UpdateExpenseInput,
    UpdateIncomeInput,
};
pub use report::ReportRepository;
pub use tariff::TariffRepository;
pub use unit::UnitRepository;

use sea_orm::{ConnectionTrait, DbBackend, DbErr, RuntimeErr, Statement};
use uuid::Uuid;

use kasdes_core::ledger::LedgerError;

/// Error type shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A domain rule or invariant was violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Stable machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Database(_) => "PERSISTENCE_FAILED",
        }
    }

    /// HTTP status code this error maps to.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(err) => err.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Message safe to show to API clients. Internal failures (broken
    /// chain, database errors) are masked; full detail goes to the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Ledger(err) if !err.is_masked() => err.to_string(),
            Self::Ledger(_) | Self::Database(_) => {
                "Unable to complete the operation, please retry".to_string()
            }
        }
    }

    /// Whether retrying the operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            Self::Database(err) => is_serialization_failure(err),
        }
    }
}

/// Detects Postgres serialization failures (SQLSTATE 40001) and deadlocks
/// (40P01), both of which are safe to retry.
fn is_serialization_failure(err: &DbErr) -> bool {
    let sqlx_err = match err {
        DbErr::Conn(RuntimeErr::SqlxError(e))
        | DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e)) => e,
        _ => return false,
    };
    match sqlx_err {
        sqlx::Error::Database(db) => matches!(db.code().as_deref(), Some("40001" | "40P01")),
        _ => false,
    }
}

/// Locks a unit's row for the duration of the surrounding SQL transaction.
///
/// All ledger mutations for a unit funnel through this lock, which
/// serializes the read-compute-write sequence per unit while leaving other
/// units untouched.
pub(crate) async fn lock_unit<C: ConnectionTrait>(
    conn: &C,
    unit_id: Uuid,
) -> Result<(), RepositoryError> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id FROM units WHERE id = $1 FOR UPDATE",
            [unit_id.into()],
        ))
        .await?;

    if row.is_none() {
        return Err(LedgerError::UnitNotFound(unit_id).into());
    }
    Ok(())
}
