use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use kasdes_shared::types::{LedgerEntryId, UnitId};

use super::service::ReportService;
use super::types::SourceDescription;
use crate::ledger::chain::chain_next;
use crate::ledger::{EntryKind, LedgerEntry};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
}

/// Builds a valid chain from an opening balance and dated operations.
fn chain(
    unit_id: UnitId,
    opening: Decimal,
    ops: &[(EntryKind, Decimal, DateTime<Utc>)],
) -> Vec<LedgerEntry> {
    let mut entries = Vec::with_capacity(ops.len());
    let mut last = opening;
    for (kind, amount, occurred_at) in ops {
        let (before, after) = chain_next(last, *kind, *amount);
        entries.push(LedgerEntry {
            id: LedgerEntryId::new(),
            unit_id,
            kind: *kind,
            source_id: Uuid::now_v7(),
            balance_before: before,
            balance_after: after,
            occurred_at: *occurred_at,
        });
        last = after;
    }
    entries
}

fn source(
    entry: &LedgerEntry,
    description: &str,
    updated_at: DateTime<Utc>,
) -> SourceDescription {
    SourceDescription {
        source_id: entry.source_id,
        unit_id: entry.unit_id,
        kind: entry.kind,
        description: description.to_string(),
        occurred_at: entry.occurred_at,
        updated_at,
    }
}

#[test]
fn test_monthly_summary_groups_by_calendar_month() {
    let unit_id = UnitId::new();
    let entries = chain(
        unit_id,
        dec!(100_000),
        &[
            (EntryKind::Income, dec!(50_000), at(2026, 7, 5)),
            (EntryKind::Expense, dec!(20_000), at(2026, 7, 20)),
            (EntryKind::Income, dec!(10_000), at(2026, 8, 3)),
        ],
    );

    let summary = ReportService::monthly_summary(unit_id, &entries);

    assert_eq!(summary.months.len(), 2);
    // Descending: August first.
    let august = &summary.months[0];
    assert_eq!((august.year, august.month), (2026, 8));
    assert_eq!(august.totals.income, dec!(10_000));
    assert_eq!(august.closing_balance, dec!(140_000));
    assert_eq!(august.entry_count, 1);

    let july = &summary.months[1];
    assert_eq!((july.year, july.month), (2026, 7));
    assert_eq!(july.totals.income, dec!(50_000));
    assert_eq!(july.totals.expense, dec!(20_000));
    assert_eq!(july.totals.net, dec!(30_000));
    // Closing snapshot is the month's latest entry.
    assert_eq!(july.closing_balance, dec!(130_000));
    assert_eq!(july.closing_formatted, "130.000");

    assert_eq!(summary.totals.income, dec!(60_000));
    assert_eq!(summary.totals.expense, dec!(20_000));
}

#[test]
fn test_monthly_summary_is_idempotent() {
    let unit_id = UnitId::new();
    let entries = chain(
        unit_id,
        dec!(0),
        &[
            (EntryKind::Income, dec!(5_000), at(2026, 6, 1)),
            (EntryKind::Expense, dec!(1_000), at(2026, 6, 2)),
        ],
    );

    let first = ReportService::monthly_summary(unit_id, &entries);
    let second = ReportService::monthly_summary(unit_id, &entries);
    assert_eq!(first.months.len(), second.months.len());
    assert_eq!(first.totals, second.totals);
    assert_eq!(
        first.months[0].closing_balance,
        second.months[0].closing_balance
    );
}

#[test]
fn test_zero_entry_unit_yields_empty_summary() {
    let unit_id = UnitId::new();
    let summary = ReportService::monthly_summary(unit_id, &[]);
    assert!(summary.months.is_empty());
    assert_eq!(summary.totals.income, Decimal::ZERO);
    assert_eq!(summary.totals.expense, Decimal::ZERO);
    assert_eq!(summary.totals.net, Decimal::ZERO);

    let detail = ReportService::daily_detail(unit_id, 2026, 8, &[], &[]);
    assert!(detail.rows.is_empty());
    assert_eq!(detail.totals.net_formatted, "0");
}

#[test]
fn test_daily_detail_rows_descend_with_signed_magnitudes() {
    let unit_id = UnitId::new();
    let entries = chain(
        unit_id,
        dec!(100_000),
        &[
            (EntryKind::Income, dec!(50_000), at(2026, 8, 5)),
            (EntryKind::Expense, dec!(20_000), at(2026, 8, 12)),
        ],
    );
    let sources = vec![
        source(&entries[0], "Karang Taruna - hourly_rental", at(2026, 8, 5)),
        source(&entries[1], "Net replacement", at(2026, 8, 12)),
    ];

    let detail = ReportService::daily_detail(unit_id, 2026, 8, &entries, &sources);

    assert_eq!(detail.rows.len(), 2);
    // Newest first.
    let expense_row = &detail.rows[0];
    assert_eq!(expense_row.kind, EntryKind::Expense);
    assert_eq!(expense_row.amount, dec!(20_000));
    assert_eq!(expense_row.amount_formatted, "20.000");
    assert_eq!(expense_row.description, "Net replacement");
    assert_eq!(expense_row.balance_after, dec!(130_000));

    let income_row = &detail.rows[1];
    assert_eq!(income_row.amount, dec!(50_000));
    assert_eq!(income_row.description, "Karang Taruna - hourly_rental");

    assert_eq!(detail.totals.income, dec!(50_000));
    assert_eq!(detail.totals.expense, dec!(20_000));
    assert_eq!(detail.totals.net, dec!(30_000));
}

#[test]
fn test_description_falls_back_to_same_day_newest() {
    let unit_id = UnitId::new();
    let entries = chain(
        unit_id,
        dec!(0),
        &[(EntryKind::Income, dec!(10_000), at(2026, 8, 5))],
    );

    // No source carries the entry's source_id; two same-day income sources
    // compete and the most recently updated one wins.
    let mut older = source(&entries[0], "Morning booking", at(2026, 8, 5));
    older.source_id = Uuid::now_v7();
    let mut newer = source(&entries[0], "Evening booking", at(2026, 8, 6));
    newer.source_id = Uuid::now_v7();

    let resolved =
        ReportService::resolve_description(&entries[0], &[older.clone(), newer.clone()]);
    assert_eq!(resolved, "Evening booking");

    // Order of the slice must not matter.
    let resolved = ReportService::resolve_description(&entries[0], &[newer, older]);
    assert_eq!(resolved, "Evening booking");
}

#[test]
fn test_same_day_income_and_expense_resolve_independently() {
    let unit_id = UnitId::new();
    let entries = chain(
        unit_id,
        dec!(0),
        &[
            (EntryKind::Income, dec!(10_000), at(2026, 8, 5)),
            (EntryKind::Expense, dec!(4_000), at(2026, 8, 5)),
        ],
    );

    // Fallback sources only; the expense source is updated later, but it
    // must never answer for the income entry.
    let mut income_src = source(&entries[0], "Court rental", at(2026, 8, 5));
    income_src.source_id = Uuid::now_v7();
    let mut expense_src = source(&entries[1], "Ball pump", at(2026, 8, 7));
    expense_src.source_id = Uuid::now_v7();
    let sources = vec![income_src, expense_src];

    assert_eq!(
        ReportService::resolve_description(&entries[0], &sources),
        "Court rental"
    );
    assert_eq!(
        ReportService::resolve_description(&entries[1], &sources),
        "Ball pump"
    );
}

#[test]
fn test_description_defaults_to_generic() {
    let unit_id = UnitId::new();
    let entries = chain(
        unit_id,
        dec!(0),
        &[
            (EntryKind::Income, dec!(10_000), at(2026, 8, 5)),
            (EntryKind::Expense, dec!(4_000), at(2026, 8, 5)),
        ],
    );

    assert_eq!(
        ReportService::resolve_description(&entries[0], &[]),
        "General income"
    );
    assert_eq!(
        ReportService::resolve_description(&entries[1], &[]),
        "General expense"
    );

    // A same-day source of another unit never matches.
    let mut foreign = source(&entries[0], "Someone else's booking", at(2026, 8, 5));
    foreign.source_id = Uuid::now_v7();
    foreign.unit_id = UnitId::new();
    assert_eq!(
        ReportService::resolve_description(&entries[0], &[foreign]),
        "General income"
    );
}
