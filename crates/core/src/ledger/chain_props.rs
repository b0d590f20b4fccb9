//! Property tests for the balance chain.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use kasdes_shared::types::{LedgerEntryId, UnitId};

use super::chain::{cascade_delete, cascade_edit, chain_next, resolve_balance, verify_chain};
use super::types::{EntryKind, LedgerEntry};

/// Strategy for a positive transaction amount (2 decimal places).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn kind_strategy() -> impl Strategy<Value = EntryKind> {
    prop_oneof![Just(EntryKind::Income), Just(EntryKind::Expense)]
}

fn ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<(EntryKind, Decimal)>> {
    prop::collection::vec((kind_strategy(), amount_strategy()), 1..=max_len)
}

fn opening_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

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
            occurred_at: base + Duration::seconds(i as i64),
        });
        last = after;
    }
    entries
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Folding the ordered ledger from the opening balance reproduces every
    /// stored balance_after.
    #[test]
    fn prop_fold_reproduces_every_balance(
        opening in opening_strategy(),
        ops in ops_strategy(24),
    ) {
        let entries = build_chain(opening, &ops);

        let mut running = opening;
        for (entry, (kind, amount)) in entries.iter().zip(&ops) {
            running += kind.signed(*amount);
            prop_assert_eq!(entry.balance_after, running);
        }
        prop_assert!(verify_chain(opening, &entries).is_ok());
    }

    /// The resolver always returns the last entry's balance_after, or the
    /// opening balance for an empty ledger.
    #[test]
    fn prop_resolver_matches_last_entry(
        opening in opening_strategy(),
        ops in ops_strategy(16),
    ) {
        let entries = build_chain(opening, &ops);
        let resolved = resolve_balance(opening, entries.last().map(|e| e.balance_after));
        let expected = opening + ops.iter().map(|(k, a)| k.signed(*a)).sum::<Decimal>();
        prop_assert_eq!(resolved, expected);
        prop_assert_eq!(resolve_balance(opening, None), opening);
    }

    /// Editing any entry by a new amount shifts every later entry and the
    /// final balance by exactly the signed delta, and the chain invariant
    /// survives.
    #[test]
    fn prop_edit_cascade_preserves_invariant(
        opening in opening_strategy(),
        ops in ops_strategy(16),
        target_seed in any::<prop::sample::Index>(),
        new_amount in amount_strategy(),
    ) {
        let mut entries = build_chain(opening, &ops);
        let target = target_seed.index(entries.len());
        let final_before = entries.last().unwrap().balance_after;
        let untouched: Vec<Decimal> = entries[..target]
            .iter()
            .map(|e| e.balance_after)
            .collect();

        let signed = cascade_edit(&mut entries, target, new_amount).unwrap();

        // Entries before the target are untouched.
        for (entry, after) in entries[..target].iter().zip(untouched) {
            prop_assert_eq!(entry.balance_after, after);
        }
        // The final balance moved by exactly the signed delta.
        prop_assert_eq!(
            entries.last().unwrap().balance_after,
            final_before + signed
        );
        prop_assert!(verify_chain(opening, &entries).is_ok());
        // The target now carries the new magnitude.
        prop_assert_eq!(entries[target].magnitude(), new_amount);
    }

    /// Deleting any entry splices the chain, keeps the invariant, and drops
    /// the final balance by exactly the removed contribution.
    #[test]
    fn prop_delete_cascade_preserves_invariant(
        opening in opening_strategy(),
        ops in ops_strategy(16),
        target_seed in any::<prop::sample::Index>(),
    ) {
        let mut entries = build_chain(opening, &ops);
        let target = target_seed.index(entries.len());
        let final_before = entries.last().unwrap().balance_after;

        let removed = cascade_delete(&mut entries, target).unwrap();

        prop_assert!(verify_chain(opening, &entries).is_ok());
        let final_after = entries
            .last()
            .map_or(opening, |e| e.balance_after);
        prop_assert_eq!(final_after, final_before - removed.contribution());
    }

    /// Editing and then editing back to the original amount is a no-op on
    /// the chain.
    #[test]
    fn prop_edit_roundtrip_is_identity(
        opening in opening_strategy(),
        ops in ops_strategy(12),
        target_seed in any::<prop::sample::Index>(),
        new_amount in amount_strategy(),
    ) {
        let mut entries = build_chain(opening, &ops);
        let target = target_seed.index(entries.len());
        let original = entries.clone();
        let original_amount = entries[target].magnitude();

        cascade_edit(&mut entries, target, new_amount).unwrap();
        cascade_edit(&mut entries, target, original_amount).unwrap();

        prop_assert_eq!(entries, original);
    }
}
