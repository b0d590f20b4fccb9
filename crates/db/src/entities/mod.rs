//! `SeaORM` entity definitions.

pub mod expense_transactions;
pub mod income_transactions;
pub mod ledger_entries;
pub mod opening_balances;
pub mod sea_orm_active_enums;
pub mod tariffs;
pub mod units;
