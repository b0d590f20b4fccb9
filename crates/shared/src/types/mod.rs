//! Shared domain types.

pub mod amount;
pub mod id;
pub mod pagination;

pub use amount::format_amount;
pub use id::{ExpenseId, IncomeId, LedgerEntryId, TariffId, UnitId};
pub use pagination::{PageMeta, PageRequest, PageResponse};
