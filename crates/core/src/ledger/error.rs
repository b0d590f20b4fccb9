//! Ledger error types for validation, reconciliation, and state errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount must be positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// Amount must not be negative. Used where zero is a legal value, such
    /// as an opening balance.
    #[error("Amount must not be negative")]
    NegativeAmount,

    /// Quantity must be positive.
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    /// Tenant name is required for income transactions.
    #[error("Tenant name is required")]
    EmptyTenant,

    /// Category is required.
    #[error("Category is required")]
    EmptyCategory,

    /// Unit name is required.
    #[error("Unit name is required")]
    EmptyName,

    /// Description is required for expense transactions.
    #[error("Description is required")]
    EmptyDescription,

    /// A text field exceeded its maximum length.
    #[error("Field '{field}' exceeds {max} characters")]
    FieldTooLong {
        /// The offending field name.
        field: &'static str,
        /// The maximum allowed length.
        max: usize,
    },

    // ========== Lookup Errors ==========
    /// Unit not found.
    #[error("Unit not found: {0}")]
    UnitNotFound(Uuid),

    /// No tariff exists for the (unit, category) pair.
    #[error("No tariff found for category '{category}' on unit {unit_id}")]
    TariffNotFound {
        /// The unit the income was recorded against.
        unit_id: Uuid,
        /// The requested tariff category.
        category: String,
    },

    /// Tariff not found by id.
    #[error("Tariff not found: {0}")]
    TariffNotFoundById(Uuid),

    /// Source transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Ledger entry not found for a source transaction.
    #[error("No ledger entry found for transaction {0}")]
    EntryNotFound(Uuid),

    // ========== Invariant Errors ==========
    /// The stored chain is broken: an entry's balance_before does not match
    /// its predecessor's balance_after. A write that would produce or read
    /// through such a chain must abort.
    #[error(
        "Ledger chain corrupted for unit {unit_id}: expected balance {expected}, found {found}"
    )]
    ChainCorrupted {
        /// The unit whose chain is broken.
        unit_id: Uuid,
        /// The balance the chain invariant requires.
        expected: Decimal,
        /// The balance actually stored.
        found: Decimal,
    },

    // ========== Concurrency Errors ==========
    /// Concurrent modification detected.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Storage Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::NonPositiveQuantity => "NON_POSITIVE_QUANTITY",
            Self::EmptyTenant => "EMPTY_TENANT",
            Self::EmptyCategory => "EMPTY_CATEGORY",
            Self::EmptyName => "EMPTY_NAME",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::FieldTooLong { .. } => "FIELD_TOO_LONG",
            Self::UnitNotFound(_) => "UNIT_NOT_FOUND",
            Self::TariffNotFound { .. } | Self::TariffNotFoundById(_) => "TARIFF_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::ChainCorrupted { .. } => "CHAIN_CORRUPTED",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::NonPositiveAmount
            | Self::NegativeAmount
            | Self::NonPositiveQuantity
            | Self::EmptyTenant
            | Self::EmptyCategory
            | Self::EmptyName
            | Self::EmptyDescription
            | Self::FieldTooLong { .. } => 400,

            // 404 Not Found
            Self::UnitNotFound(_)
            | Self::TariffNotFound { .. }
            | Self::TariffNotFoundById(_)
            | Self::TransactionNotFound(_)
            | Self::EntryNotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::ConcurrentModification => 409,

            // 500 Internal Server Error - chain corruption is a logic
            // defect, never a user mistake
            Self::ChainCorrupted { .. } | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }

    /// Returns true if the user-visible message must be masked.
    ///
    /// Chain corruption signals a bug upstream; callers get a generic
    /// "please retry" while full context is logged.
    #[must_use]
    pub fn is_masked(&self) -> bool {
        matches!(
            self,
            Self::ChainCorrupted { .. } | Self::Database(_) | Self::Internal(_)
        )
    }
}
