//! Ledger entry domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kasdes_shared::types::{LedgerEntryId, UnitId};

/// Kind of ledger entry.
///
/// Income raises a unit's balance, expense lowers it. The kind also decides
/// how a report row derives its signed delta from the before/after pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money coming in (rental, sale, usage fee).
    Income,
    /// Money going out.
    Expense,
}

impl EntryKind {
    /// Returns the signed effect of an amount of this kind on a balance.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }

    /// Default description used when no source transaction can be resolved.
    #[must_use]
    pub const fn generic_description(self) -> &'static str {
        match self {
            Self::Income => "General income",
            Self::Expense => "General expense",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

/// A single balance snapshot in a unit's ledger.
///
/// Entries form a chain: sorted by `(occurred_at, id)`, each entry's
/// `balance_before` equals the previous entry's `balance_after`, and the
/// first entry's `balance_before` equals the unit's opening balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The unit whose balance this entry snapshots.
    pub unit_id: UnitId,
    /// Income or expense.
    pub kind: EntryKind,
    /// The originating source transaction (income or expense row).
    pub source_id: Uuid,
    /// Balance before this entry took effect.
    pub balance_before: Decimal,
    /// Balance after this entry took effect.
    pub balance_after: Decimal,
    /// When the underlying event happened; position in the unit's chain.
    pub occurred_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// The magnitude this entry moved the balance by (always non-negative
    /// for a well-formed entry).
    #[must_use]
    pub fn magnitude(&self) -> Decimal {
        match self.kind {
            EntryKind::Income => self.balance_after - self.balance_before,
            EntryKind::Expense => self.balance_before - self.balance_after,
        }
    }

    /// The signed contribution of this entry to the running balance.
    #[must_use]
    pub fn contribution(&self) -> Decimal {
        self.balance_after - self.balance_before
    }
}

/// Input for recording an income transaction.
#[derive(Debug, Clone)]
pub struct IncomeInput {
    /// The unit earning the income.
    pub unit_id: UnitId,
    /// Tenant or payer name.
    pub tenant: String,
    /// Tariff category, e.g. "hourly_rental".
    pub category: String,
    /// Quantity in the tariff's unit of measure.
    pub quantity: Decimal,
    /// Optional free-form note.
    pub note: Option<String>,
    /// When the rental/usage happened.
    pub occurred_at: DateTime<Utc>,
}

/// Input for recording an expense transaction.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    /// The unit carrying the expense.
    pub unit_id: UnitId,
    /// Expense category, e.g. "maintenance".
    pub category: String,
    /// What the money was spent on.
    pub description: String,
    /// Amount spent (positive).
    pub amount: Decimal,
    /// When the expense happened.
    pub occurred_at: DateTime<Utc>,
}
