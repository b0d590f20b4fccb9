//! Balance ledger logic.
//!
//! This module implements the core ledger functionality:
//! - Ledger entry domain types
//! - Chain math (record, cascade on edit, splice on delete)
//! - Business rule validation for income and expense input
//! - Error types for ledger operations

pub mod chain;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod chain_props;

pub use chain::{cascade_delete, cascade_edit, chain_next, resolve_balance, verify_chain};
pub use error::LedgerError;
pub use types::{EntryKind, ExpenseInput, IncomeInput, LedgerEntry};
