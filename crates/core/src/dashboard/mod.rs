//! Cross-unit dashboard rollup.
//!
//! The head-office view: every unit's current balance plus its
//! current-month income and expense, combined in parallel since units are
//! independent of each other.

use chrono::{DateTime, Datelike, Utc};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use kasdes_shared::types::{format_amount, UnitId};

use crate::ledger::{resolve_balance, LedgerEntry};
use crate::reports::ReportService;
use crate::unit::{Unit, UnitKind};

/// Everything needed to roll up one unit: the unit itself, its opening
/// balance and its full ordered ledger.
#[derive(Debug, Clone)]
pub struct UnitLedger {
    /// The unit being rolled up.
    pub unit: Unit,
    /// Opening balance before the first ledger entry.
    pub opening_balance: Decimal,
    /// Entries ascending by `(occurred_at, id)`.
    pub entries: Vec<LedgerEntry>,
}

/// One unit's line on the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct UnitRollup {
    /// The unit.
    pub unit_id: UnitId,
    /// Unit display name.
    pub name: String,
    /// Unit kind.
    pub kind: UnitKind,
    /// Current balance.
    pub balance: Decimal,
    /// Display form of `balance`.
    pub balance_formatted: String,
    /// Income recorded in the reference month.
    pub month_income: Decimal,
    /// Expense recorded in the reference month.
    pub month_expense: Decimal,
}

/// The combined dashboard across all units.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Per-unit lines, ordered by unit name.
    pub units: Vec<UnitRollup>,
    /// Sum of all unit balances.
    pub total_balance: Decimal,
    /// Display form of `total_balance`.
    pub total_formatted: String,
    /// When the rollup was computed.
    pub generated_at: DateTime<Utc>,
}

/// Rolls up all units for the calendar month containing `now`.
///
/// Units are processed in parallel; each rollup only touches its own
/// ledger, so no coordination is needed.
#[must_use]
pub fn roll_up(ledgers: Vec<UnitLedger>, now: DateTime<Utc>) -> DashboardSummary {
    let (year, month) = (now.year(), now.month());

    let mut units: Vec<UnitRollup> = ledgers
        .into_par_iter()
        .map(|ledger| {
            let balance = resolve_balance(
                ledger.opening_balance,
                ledger.entries.last().map(|e| e.balance_after),
            );
            let in_month: Vec<LedgerEntry> = ledger
                .entries
                .into_iter()
                .filter(|e| e.occurred_at.year() == year && e.occurred_at.month() == month)
                .collect();
            let totals = ReportService::totals(&in_month);

            UnitRollup {
                unit_id: ledger.unit.id,
                name: ledger.unit.name,
                kind: ledger.unit.kind,
                balance,
                balance_formatted: format_amount(balance),
                month_income: totals.income,
                month_expense: totals.expense,
            }
        })
        .collect();

    units.sort_by(|a, b| a.name.cmp(&b.name));
    let total_balance: Decimal = units.iter().map(|u| u.balance).sum();

    DashboardSummary {
        units,
        total_balance,
        total_formatted: format_amount(total_balance),
        generated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kasdes_shared::types::LedgerEntryId;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::ledger::chain::chain_next;
    use crate::ledger::EntryKind;

    fn unit(name: &str, kind: UnitKind) -> Unit {
        Unit {
            id: UnitId::new(),
            name: name.to_string(),
            kind,
            created_at: Utc::now(),
        }
    }

    fn ledger(
        unit: Unit,
        opening: Decimal,
        ops: &[(EntryKind, Decimal, DateTime<Utc>)],
    ) -> UnitLedger {
        let mut entries = Vec::with_capacity(ops.len());
        let mut last = opening;
        for (kind, amount, occurred_at) in ops {
            let (before, after) = chain_next(last, *kind, *amount);
            entries.push(LedgerEntry {
                id: LedgerEntryId::new(),
                unit_id: unit.id,
                kind: *kind,
                source_id: Uuid::now_v7(),
                balance_before: before,
                balance_after: after,
                occurred_at: *occurred_at,
            });
            last = after;
        }
        UnitLedger {
            unit,
            opening_balance: opening,
            entries,
        }
    }

    #[test]
    fn test_roll_up_combines_units() {
        let now = Utc.with_ymd_and_hms(2026, 8, 20, 12, 0, 0).unwrap();
        let july = Utc.with_ymd_and_hms(2026, 7, 2, 9, 0, 0).unwrap();
        let august = Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap();

        let field = ledger(
            unit("Sports field", UnitKind::SportsField),
            dec!(100_000),
            &[
                (EntryKind::Income, dec!(50_000), july),
                (EntryKind::Expense, dec!(20_000), august),
            ],
        );
        let kiosk = ledger(unit("Kiosk", UnitKind::Kiosk), dec!(75_000), &[]);

        let dashboard = roll_up(vec![field, kiosk], now);

        assert_eq!(dashboard.units.len(), 2);
        // Sorted by name.
        assert_eq!(dashboard.units[0].name, "Kiosk");
        assert_eq!(dashboard.units[0].balance, dec!(75_000));
        assert_eq!(dashboard.units[0].month_income, Decimal::ZERO);

        let field_row = &dashboard.units[1];
        assert_eq!(field_row.balance, dec!(130_000));
        // July income is outside the reference month.
        assert_eq!(field_row.month_income, Decimal::ZERO);
        assert_eq!(field_row.month_expense, dec!(20_000));

        assert_eq!(dashboard.total_balance, dec!(205_000));
        assert_eq!(dashboard.total_formatted, "205.000");
    }

    #[test]
    fn test_roll_up_empty_is_zero() {
        let dashboard = roll_up(Vec::new(), Utc::now());
        assert!(dashboard.units.is_empty());
        assert_eq!(dashboard.total_balance, Decimal::ZERO);
    }
}
