//! Report row and summary types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use kasdes_shared::types::{format_amount, LedgerEntryId, UnitId};

use crate::ledger::EntryKind;

/// Description data pulled from a source transaction row.
///
/// Income rows contribute "tenant - category", expense rows their
/// description field. `updated_at` breaks ties when falling back to
/// same-day matching.
#[derive(Debug, Clone)]
pub struct SourceDescription {
    /// Id of the source transaction row.
    pub source_id: Uuid,
    /// Unit the transaction belongs to.
    pub unit_id: UnitId,
    /// Whether the source is an income or expense row.
    pub kind: EntryKind,
    /// Human-readable description.
    pub description: String,
    /// When the transaction happened.
    pub occurred_at: DateTime<Utc>,
    /// Last modification time; newest wins on fallback matching.
    pub updated_at: DateTime<Utc>,
}

/// One line of a daily detail report, derived from a single ledger entry.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    /// The ledger entry this row was derived from.
    pub entry_id: LedgerEntryId,
    /// Income or expense.
    pub kind: EntryKind,
    /// Resolved description of the underlying transaction.
    pub description: String,
    /// When the underlying event happened.
    pub occurred_at: DateTime<Utc>,
    /// Non-negative magnitude of the movement.
    pub amount: Decimal,
    /// Display form of `amount`.
    pub amount_formatted: String,
    /// Balance after this entry took effect.
    pub balance_after: Decimal,
    /// Display form of `balance_after`.
    pub balance_formatted: String,
}

/// Income/expense/net totals over a set of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    /// Sum of income magnitudes.
    pub income: Decimal,
    /// Sum of expense magnitudes.
    pub expense: Decimal,
    /// `income - expense`.
    pub net: Decimal,
    /// Display form of `income`.
    pub income_formatted: String,
    /// Display form of `expense`.
    pub expense_formatted: String,
    /// Display form of `net`.
    pub net_formatted: String,
}

impl ReportTotals {
    /// Builds totals from raw income and expense sums.
    #[must_use]
    pub fn new(income: Decimal, expense: Decimal) -> Self {
        let net = income - expense;
        Self {
            income,
            expense,
            net,
            income_formatted: format_amount(income),
            expense_formatted: format_amount(expense),
            net_formatted: format_amount(net),
        }
    }

    /// All-zero totals for a unit with no entries.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }
}

/// One calendar month of a unit's monthly summary.
#[derive(Debug, Clone, Serialize)]
pub struct MonthRow {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Income/expense/net within the month.
    pub totals: ReportTotals,
    /// `balance_after` of the month's latest entry.
    pub closing_balance: Decimal,
    /// Display form of `closing_balance`.
    pub closing_formatted: String,
    /// Number of ledger entries in the month.
    pub entry_count: usize,
}

/// Monthly summary for one unit, months descending.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    /// The unit reported on.
    pub unit_id: UnitId,
    /// One row per calendar month with at least one entry.
    pub months: Vec<MonthRow>,
    /// Grand totals across all months.
    pub totals: ReportTotals,
}

/// Daily detail for one unit and month, rows descending.
#[derive(Debug, Clone, Serialize)]
pub struct DailyDetail {
    /// The unit reported on.
    pub unit_id: UnitId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// One row per ledger entry in the month.
    pub rows: Vec<ReportRow>,
    /// Totals across the month.
    pub totals: ReportTotals,
}
