//! Balance chain math.
//!
//! A unit's ledger is a chain of before/after snapshots. Everything that
//! touches the chain funnels through the functions here: appending a new
//! entry, verifying the invariant, and the cascades that keep the chain
//! consistent when a past transaction is edited or deleted.
//!
//! Chain invariant, for entries sorted by `(occurred_at, id)`:
//! - `entries[i].balance_after == entries[i + 1].balance_before`
//! - `entries[0].balance_before == opening balance`
//! - each entry's after = before + signed(kind, amount)

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntryKind, LedgerEntry};

/// Computes the before/after pair for a new entry appended to a chain whose
/// last balance is `prev_after`.
#[must_use]
pub fn chain_next(prev_after: Decimal, kind: EntryKind, amount: Decimal) -> (Decimal, Decimal) {
    (prev_after, prev_after + kind.signed(amount))
}

/// Resolves the current balance of a unit.
///
/// The balance is the `balance_after` of the most recent entry; a unit with
/// an empty ledger falls back to its opening balance (zero when that is
/// absent too, which the caller encodes as `Decimal::ZERO`).
#[must_use]
pub fn resolve_balance(opening: Decimal, last_after: Option<Decimal>) -> Decimal {
    last_after.unwrap_or(opening)
}

/// Verifies the chain invariant over a unit's full ordered ledger.
///
/// `entries` must be sorted ascending by `(occurred_at, id)`.
///
/// # Errors
///
/// Returns `ChainCorrupted` at the first link whose `balance_before` does
/// not match its predecessor's `balance_after` (or the opening balance for
/// the first entry), or whose own before/after pair moves the wrong way for
/// its kind.
pub fn verify_chain(opening: Decimal, entries: &[LedgerEntry]) -> Result<(), LedgerError> {
    let mut expected = opening;
    for entry in entries {
        if entry.balance_before != expected {
            return Err(LedgerError::ChainCorrupted {
                unit_id: entry.unit_id.into_inner(),
                expected,
                found: entry.balance_before,
            });
        }
        if entry.magnitude() < Decimal::ZERO {
            return Err(LedgerError::ChainCorrupted {
                unit_id: entry.unit_id.into_inner(),
                expected: entry.balance_before,
                found: entry.balance_after,
            });
        }
        expected = entry.balance_after;
    }
    Ok(())
}

/// Applies an amount edit to the entry at `target` and cascades the delta
/// through every later entry.
///
/// The target's `balance_before` is untouched (it is determined by what
/// precedes it); its `balance_after` shifts by the signed delta, and every
/// later entry shifts both balances by the same delta. This holds no matter
/// where in the chain the target sits - patching only the latest entry
/// would silently break the invariant for everything after the target.
///
/// `entries` must be the unit's full ordered tail starting no later than
/// the target. Returns the signed delta applied.
///
/// # Errors
///
/// Returns `Internal` if `target` is out of range.
pub fn cascade_edit(
    entries: &mut [LedgerEntry],
    target: usize,
    new_amount: Decimal,
) -> Result<Decimal, LedgerError> {
    let Some(entry) = entries.get(target) else {
        return Err(LedgerError::Internal(format!(
            "cascade target {target} out of range ({} entries)",
            entries.len()
        )));
    };

    let delta = new_amount - entry.magnitude();
    let signed = entry.kind.signed(delta);

    entries[target].balance_after += signed;
    for later in &mut entries[target + 1..] {
        later.balance_before += signed;
        later.balance_after += signed;
    }

    Ok(signed)
}

/// Removes the entry at `target` from the chain and splices the gap shut.
///
/// The entry immediately after the removed one inherits the removed entry's
/// `balance_before`, and every later entry shifts by the removed entry's
/// negated contribution - equivalently, all entries past the target shift
/// down by `contribution()`.
///
/// Returns the removed entry.
///
/// # Errors
///
/// Returns `Internal` if `target` is out of range.
pub fn cascade_delete(
    entries: &mut Vec<LedgerEntry>,
    target: usize,
) -> Result<LedgerEntry, LedgerError> {
    if target >= entries.len() {
        return Err(LedgerError::Internal(format!(
            "cascade target {target} out of range ({} entries)",
            entries.len()
        )));
    }

    let removed = entries.remove(target);
    let shift = removed.contribution();
    for later in &mut entries[target..] {
        later.balance_before -= shift;
        later.balance_after -= shift;
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use kasdes_shared::types::{LedgerEntryId, UnitId};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn build_chain(opening: Decimal, ops: &[(EntryKind, Decimal)]) -> Vec<LedgerEntry> {
        let unit_id = UnitId::new();
        let base = Utc::now();
        let mut entries = Vec::with_capacity(ops.len());
        let mut last = opening;
        for (i, (kind, amount)) in ops.iter().enumerate() {
            let (before, after) = chain_next(last, *kind, *amount);
            entries.push(LedgerEntry {
                id: LedgerEntryId::new(),
                unit_id,
                kind: *kind,
                source_id: Uuid::now_v7(),
                balance_before: before,
                balance_after: after,
                occurred_at: base + Duration::minutes(i as i64),
            });
            last = after;
        }
        entries
    }

    #[test]
    fn test_resolve_balance() {
        assert_eq!(resolve_balance(dec!(100_000), None), dec!(100_000));
        assert_eq!(
            resolve_balance(dec!(100_000), Some(dec!(130_000))),
            dec!(130_000)
        );
        assert_eq!(resolve_balance(Decimal::ZERO, None), Decimal::ZERO);
    }

    #[test]
    fn test_chain_next() {
        assert_eq!(
            chain_next(dec!(100_000), EntryKind::Income, dec!(50_000)),
            (dec!(100_000), dec!(150_000))
        );
        assert_eq!(
            chain_next(dec!(150_000), EntryKind::Expense, dec!(20_000)),
            (dec!(150_000), dec!(130_000))
        );
    }

    #[test]
    fn test_verify_chain_accepts_well_formed() {
        let entries = build_chain(
            dec!(100_000),
            &[
                (EntryKind::Income, dec!(50_000)),
                (EntryKind::Expense, dec!(20_000)),
                (EntryKind::Income, dec!(5_000)),
            ],
        );
        assert!(verify_chain(dec!(100_000), &entries).is_ok());
    }

    #[test]
    fn test_verify_chain_detects_broken_link() {
        let mut entries = build_chain(
            dec!(0),
            &[
                (EntryKind::Income, dec!(10)),
                (EntryKind::Income, dec!(20)),
            ],
        );
        entries[1].balance_before = dec!(99);
        entries[1].balance_after = dec!(119);

        let err = verify_chain(dec!(0), &entries).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ChainCorrupted {
                expected,
                found,
                ..
            } if expected == dec!(10) && found == dec!(99)
        ));
    }

    #[test]
    fn test_verify_chain_detects_wrong_opening() {
        let entries = build_chain(dec!(500), &[(EntryKind::Income, dec!(10))]);
        assert!(verify_chain(dec!(400), &entries).is_err());
    }

    #[test]
    fn test_verify_chain_detects_inverted_entry() {
        let mut entries = build_chain(dec!(0), &[(EntryKind::Income, dec!(10))]);
        // An income entry that lowers the balance violates the kind rule.
        entries[0].balance_after = dec!(-5);
        assert!(verify_chain(dec!(0), &entries).is_err());
    }

    /// The worked scenario: opening 100 000, income 50 000, expense 20 000,
    /// then the income is edited to 80 000.
    #[test]
    fn test_edit_income_cascades_through_expense() {
        let mut entries = build_chain(
            dec!(100_000),
            &[
                (EntryKind::Income, dec!(50_000)),
                (EntryKind::Expense, dec!(20_000)),
            ],
        );
        assert_eq!(entries[1].balance_after, dec!(130_000));

        let signed = cascade_edit(&mut entries, 0, dec!(80_000)).unwrap();
        assert_eq!(signed, dec!(30_000));

        assert_eq!(entries[0].balance_before, dec!(100_000));
        assert_eq!(entries[0].balance_after, dec!(180_000));
        assert_eq!(entries[1].balance_before, dec!(180_000));
        assert_eq!(entries[1].balance_after, dec!(160_000));
        assert!(verify_chain(dec!(100_000), &entries).is_ok());
    }

    #[test]
    fn test_edit_expense_shifts_later_entries_down() {
        let mut entries = build_chain(
            dec!(0),
            &[
                (EntryKind::Income, dec!(100)),
                (EntryKind::Expense, dec!(30)),
                (EntryKind::Income, dec!(10)),
            ],
        );

        // Raising an expense lowers every later balance.
        let signed = cascade_edit(&mut entries, 1, dec!(50)).unwrap();
        assert_eq!(signed, dec!(-20));
        assert_eq!(entries[1].balance_after, dec!(50));
        assert_eq!(entries[2].balance_before, dec!(50));
        assert_eq!(entries[2].balance_after, dec!(60));
        assert!(verify_chain(dec!(0), &entries).is_ok());
    }

    #[test]
    fn test_edit_latest_entry_touches_nothing_else() {
        let mut entries = build_chain(
            dec!(0),
            &[
                (EntryKind::Income, dec!(100)),
                (EntryKind::Expense, dec!(30)),
            ],
        );
        let first = entries[0].clone();

        cascade_edit(&mut entries, 1, dec!(40)).unwrap();
        assert_eq!(entries[0], first);
        assert_eq!(entries[1].balance_after, dec!(60));
    }

    #[test]
    fn test_delete_middle_entry_splices_chain() {
        let mut entries = build_chain(
            dec!(1_000),
            &[
                (EntryKind::Income, dec!(500)),
                (EntryKind::Expense, dec!(200)),
                (EntryKind::Income, dec!(100)),
            ],
        );

        let removed = cascade_delete(&mut entries, 1).unwrap();
        assert_eq!(removed.contribution(), dec!(-200));

        assert_eq!(entries.len(), 2);
        // Successor inherits the removed entry's balance_before.
        assert_eq!(entries[1].balance_before, dec!(1_500));
        assert_eq!(entries[1].balance_after, dec!(1_600));
        assert!(verify_chain(dec!(1_000), &entries).is_ok());
    }

    #[test]
    fn test_delete_first_entry() {
        let mut entries = build_chain(
            dec!(100),
            &[
                (EntryKind::Income, dec!(50)),
                (EntryKind::Income, dec!(25)),
            ],
        );

        cascade_delete(&mut entries, 0).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].balance_before, dec!(100));
        assert_eq!(entries[0].balance_after, dec!(125));
    }

    #[test]
    fn test_delete_only_entry_leaves_empty_chain() {
        let mut entries = build_chain(dec!(100), &[(EntryKind::Expense, dec!(40))]);
        cascade_delete(&mut entries, 0).unwrap();
        assert!(entries.is_empty());
        assert_eq!(resolve_balance(dec!(100), None), dec!(100));
    }

    #[test]
    fn test_out_of_range_targets_rejected() {
        let mut entries = build_chain(dec!(0), &[(EntryKind::Income, dec!(10))]);
        assert!(cascade_edit(&mut entries, 5, dec!(1)).is_err());
        assert!(cascade_delete(&mut entries, 5).is_err());
    }
}
