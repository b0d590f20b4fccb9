//! Pure aggregation logic behind the report endpoints.

use chrono::Datelike;
use rust_decimal::Decimal;

use kasdes_shared::types::{format_amount, UnitId};

use super::types::{
    DailyDetail, MonthRow, MonthlySummary, ReportRow, ReportTotals, SourceDescription,
};
use crate::ledger::{EntryKind, LedgerEntry};

/// Stateless report aggregation over chronologically ordered entries.
///
/// Callers (the report repository) pass entries already sorted ascending by
/// `(occurred_at, id)`; output rows are returned newest-first.
pub struct ReportService;

impl ReportService {
    /// Builds the monthly summary for one unit.
    ///
    /// Each calendar month with at least one entry yields a row; the
    /// month's latest entry supplies the closing balance. Months are
    /// returned descending. A unit with no entries yields no months and
    /// zero totals.
    #[must_use]
    pub fn monthly_summary(unit_id: UnitId, entries: &[LedgerEntry]) -> MonthlySummary {
        let mut months: Vec<MonthRow> = Vec::new();

        for entry in entries {
            let year = entry.occurred_at.year();
            let month = entry.occurred_at.month();
            let magnitude = entry.magnitude();

            match months.last_mut() {
                Some(row) if row.year == year && row.month == month => {
                    let (mut income, mut expense) = (row.totals.income, row.totals.expense);
                    match entry.kind {
                        EntryKind::Income => income += magnitude,
                        EntryKind::Expense => expense += magnitude,
                    }
                    row.totals = ReportTotals::new(income, expense);
                    row.closing_balance = entry.balance_after;
                    row.closing_formatted = format_amount(entry.balance_after);
                    row.entry_count += 1;
                }
                _ => {
                    let (income, expense) = match entry.kind {
                        EntryKind::Income => (magnitude, Decimal::ZERO),
                        EntryKind::Expense => (Decimal::ZERO, magnitude),
                    };
                    months.push(MonthRow {
                        year,
                        month,
                        totals: ReportTotals::new(income, expense),
                        closing_balance: entry.balance_after,
                        closing_formatted: format_amount(entry.balance_after),
                        entry_count: 1,
                    });
                }
            }
        }

        let totals = Self::totals(entries);
        months.reverse();
        MonthlySummary {
            unit_id,
            months,
            totals,
        }
    }

    /// Builds the daily detail report for one unit and calendar month.
    ///
    /// `entries` must already be filtered to the month. Rows come back
    /// newest-first with resolved descriptions.
    #[must_use]
    pub fn daily_detail(
        unit_id: UnitId,
        year: i32,
        month: u32,
        entries: &[LedgerEntry],
        sources: &[SourceDescription],
    ) -> DailyDetail {
        let mut rows: Vec<ReportRow> = entries
            .iter()
            .map(|entry| {
                let amount = entry.magnitude();
                ReportRow {
                    entry_id: entry.id,
                    kind: entry.kind,
                    description: Self::resolve_description(entry, sources),
                    occurred_at: entry.occurred_at,
                    amount,
                    amount_formatted: format_amount(amount),
                    balance_after: entry.balance_after,
                    balance_formatted: format_amount(entry.balance_after),
                }
            })
            .collect();
        rows.reverse();

        DailyDetail {
            unit_id,
            year,
            month,
            rows,
            totals: Self::totals(entries),
        }
    }

    /// Resolves the display description for a ledger entry.
    ///
    /// Resolution order: the source transaction the entry points at; then
    /// any source of the same unit, kind and calendar day with the newest
    /// `updated_at`; otherwise the kind's generic description. Income and
    /// expense sources never satisfy each other's fallback.
    #[must_use]
    pub fn resolve_description(entry: &LedgerEntry, sources: &[SourceDescription]) -> String {
        if let Some(source) = sources.iter().find(|s| s.source_id == entry.source_id) {
            return source.description.clone();
        }

        let day = entry.occurred_at.date_naive();
        sources
            .iter()
            .filter(|s| {
                s.unit_id == entry.unit_id
                    && s.kind == entry.kind
                    && s.occurred_at.date_naive() == day
            })
            .max_by_key(|s| s.updated_at)
            .map_or_else(
                || entry.kind.generic_description().to_string(),
                |s| s.description.clone(),
            )
    }

    /// Sums income and expense magnitudes over a set of entries.
    #[must_use]
    pub fn totals(entries: &[LedgerEntry]) -> ReportTotals {
        let mut income = Decimal::ZERO;
        let mut expense = Decimal::ZERO;
        for entry in entries {
            match entry.kind {
                EntryKind::Income => income += entry.magnitude(),
                EntryKind::Expense => expense += entry.magnitude(),
            }
        }
        ReportTotals::new(income, expense)
    }
}
