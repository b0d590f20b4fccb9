//! Report aggregation over ledger entries.
//!
//! Reports never consult live balances: every row is derived from the
//! immutable before/after pairs stored in the ledger, so a report is
//! reproducible for any point in history.

pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use service::ReportService;
pub use types::{DailyDetail, MonthRow, MonthlySummary, ReportRow, ReportTotals, SourceDescription};
