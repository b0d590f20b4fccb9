//! Ledger repository: transaction recording and reconciliation.
//!
//! Every mutation follows the same shape: lock the unit row, load the
//! unit's full ordered chain, run the chain math from `kasdes-core`,
//! verify the invariant, persist all touched rows in one SQL transaction,
//! then invalidate the unit's cached aggregates. A write that would leave
//! the chain broken aborts before anything is persisted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use kasdes_core::cache::AggregateCache;
use kasdes_core::ledger::validation::{validate_amount, validate_expense, validate_income};
use kasdes_core::ledger::{
    cascade_delete, cascade_edit, chain_next, resolve_balance, verify_chain, EntryKind,
    ExpenseInput, IncomeInput, LedgerEntry, LedgerError,
};
use kasdes_core::tariff::TariffService;
use kasdes_shared::types::{ExpenseId, IncomeId, LedgerEntryId, PageRequest, PageResponse, UnitId};

use super::{lock_unit, RepositoryError};
use crate::entities::{expense_transactions, income_transactions, ledger_entries, opening_balances};

/// An income transaction together with its paired ledger entry.
#[derive(Debug, Clone)]
pub struct RecordedIncome {
    /// The source transaction row.
    pub income: income_transactions::Model,
    /// The paired balance snapshot.
    pub entry: LedgerEntry,
}

/// An expense transaction together with its paired ledger entry.
#[derive(Debug, Clone)]
pub struct RecordedExpense {
    /// The source transaction row.
    pub expense: expense_transactions::Model,
    /// The paired balance snapshot.
    pub entry: LedgerEntry,
}

/// Fields that can change on an income transaction.
///
/// The amount is always recomputed from the stored rate snapshot, so a
/// quantity change is what moves the balance.
#[derive(Debug, Clone, Default)]
pub struct UpdateIncomeInput {
    /// New tenant name.
    pub tenant: Option<String>,
    /// New quantity in the tariff's unit of measure.
    pub quantity: Option<Decimal>,
    /// New note.
    pub note: Option<String>,
}

/// Fields that can change on an expense transaction.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New category.
    pub category: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
}

/// Date range filter for transaction listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    /// Only transactions at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only transactions strictly before this instant.
    pub to: Option<DateTime<Utc>>,
}

/// Repository for ledger mutations and balance resolution.
#[derive(Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    cache: Arc<AggregateCache>,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, cache: Arc<AggregateCache>) -> Self {
        Self { db, cache }
    }

    // ========== Recording ==========

    /// Records an income transaction and its paired ledger entry.
    ///
    /// The amount is quantity x the unit's current tariff rate for the
    /// category; the rate is snapshotted on the transaction row.
    ///
    /// # Errors
    ///
    /// Validation errors, `TariffNotFound`, `UnitNotFound`, or a database
    /// error. Serialization failures are retried once.
    pub async fn record_income(&self, input: IncomeInput) -> Result<RecordedIncome, RepositoryError> {
        let result = match self.record_income_inner(&input).await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(unit_id = %input.unit_id, "retrying income recording");
                self.record_income_inner(&input).await
            }
            other => other,
        }?;

        self.cache.invalidate_unit(input.unit_id);
        tracing::info!(
            unit_id = %input.unit_id,
            income_id = %result.income.id,
            amount = %result.income.amount,
            "income recorded"
        );
        Ok(result)
    }

    async fn record_income_inner(
        &self,
        input: &IncomeInput,
    ) -> Result<RecordedIncome, RepositoryError> {
        validate_income(input)?;

        let txn = self.db.begin().await?;
        lock_unit(&txn, input.unit_id.into_inner()).await?;

        let tariffs: Vec<kasdes_core::tariff::Tariff> = crate::entities::tariffs::Entity::find()
            .filter(crate::entities::tariffs::Column::UnitId.eq(input.unit_id.into_inner()))
            .filter(crate::entities::tariffs::Column::Category.eq(input.category.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        let tariff =
            TariffService::current(&tariffs, &input.category).ok_or(LedgerError::TariffNotFound {
                unit_id: input.unit_id.into_inner(),
                category: input.category.clone(),
            })?;
        let amount = TariffService::compute_total(tariff.rate, input.quantity);

        let income_id = IncomeId::new();
        let now = Utc::now();
        let income = income_transactions::ActiveModel {
            id: Set(income_id.into_inner()),
            unit_id: Set(input.unit_id.into_inner()),
            tenant: Set(input.tenant.clone()),
            category: Set(input.category.clone()),
            rate: Set(tariff.rate),
            quantity: Set(input.quantity),
            amount: Set(amount),
            note: Set(input.note.clone()),
            occurred_at: Set(input.occurred_at.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let entry = self
            .insert_chain_entry(
                &txn,
                input.unit_id,
                EntryKind::Income,
                income_id.into_inner(),
                amount,
                input.occurred_at,
            )
            .await?;

        txn.commit().await?;
        Ok(RecordedIncome { income, entry })
    }

    /// Records an expense transaction and its paired ledger entry.
    ///
    /// # Errors
    ///
    /// Validation errors, `UnitNotFound`, or a database error.
    /// Serialization failures are retried once.
    pub async fn record_expense(
        &self,
        input: ExpenseInput,
    ) -> Result<RecordedExpense, RepositoryError> {
        let result = match self.record_expense_inner(&input).await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(unit_id = %input.unit_id, "retrying expense recording");
                self.record_expense_inner(&input).await
            }
            other => other,
        }?;

        self.cache.invalidate_unit(input.unit_id);
        tracing::info!(
            unit_id = %input.unit_id,
            expense_id = %result.expense.id,
            amount = %result.expense.amount,
            "expense recorded"
        );
        Ok(result)
    }

    async fn record_expense_inner(
        &self,
        input: &ExpenseInput,
    ) -> Result<RecordedExpense, RepositoryError> {
        validate_expense(input)?;

        let txn = self.db.begin().await?;
        lock_unit(&txn, input.unit_id.into_inner()).await?;

        let expense_id = ExpenseId::new();
        let now = Utc::now();
        let expense = expense_transactions::ActiveModel {
            id: Set(expense_id.into_inner()),
            unit_id: Set(input.unit_id.into_inner()),
            category: Set(input.category.clone()),
            description: Set(input.description.clone()),
            amount: Set(input.amount),
            occurred_at: Set(input.occurred_at.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let entry = self
            .insert_chain_entry(
                &txn,
                input.unit_id,
                EntryKind::Expense,
                expense_id.into_inner(),
                input.amount,
                input.occurred_at,
            )
            .await?;

        txn.commit().await?;
        Ok(RecordedExpense { expense, entry })
    }

    // ========== Editing ==========

    /// Edits an income transaction and cascades the balance delta through
    /// every later entry of the unit's chain.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound`, validation errors, or a database error.
    pub async fn edit_income(
        &self,
        id: IncomeId,
        update: UpdateIncomeInput,
    ) -> Result<RecordedIncome, RepositoryError> {
        let result = match self.edit_income_inner(id, &update).await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(income_id = %id, "retrying income edit");
                self.edit_income_inner(id, &update).await
            }
            other => other,
        }?;

        self.cache.invalidate_unit(result.entry.unit_id);
        tracing::info!(
            income_id = %id,
            unit_id = %result.entry.unit_id,
            amount = %result.income.amount,
            "income edited"
        );
        Ok(result)
    }

    async fn edit_income_inner(
        &self,
        id: IncomeId,
        update: &UpdateIncomeInput,
    ) -> Result<RecordedIncome, RepositoryError> {
        let txn = self.db.begin().await?;

        // First fetch only resolves the unit to lock; the row is re-read
        // under the lock before anything is derived from it.
        let unit_id = income_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?
            .unit_id;
        lock_unit(&txn, unit_id).await?;

        let income = income_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?;

        let quantity = update.quantity.unwrap_or(income.quantity);
        if quantity <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveQuantity.into());
        }
        let amount = TariffService::compute_total(income.rate, quantity);

        let entry = self
            .reconcile_edit(&txn, unit_id, id.into_inner(), amount)
            .await?;

        let now = Utc::now();
        let mut active: income_transactions::ActiveModel = income.into();
        if let Some(tenant) = &update.tenant {
            active.tenant = Set(tenant.clone());
        }
        if let Some(note) = &update.note {
            active.note = Set(Some(note.clone()));
        }
        active.quantity = Set(quantity);
        active.amount = Set(amount);
        active.updated_at = Set(now.into());
        let income = active.update(&txn).await?;

        txn.commit().await?;
        Ok(RecordedIncome { income, entry })
    }

    /// Edits an expense transaction and cascades the balance delta through
    /// every later entry of the unit's chain.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound`, validation errors, or a database error.
    pub async fn edit_expense(
        &self,
        id: ExpenseId,
        update: UpdateExpenseInput,
    ) -> Result<RecordedExpense, RepositoryError> {
        let result = match self.edit_expense_inner(id, &update).await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(expense_id = %id, "retrying expense edit");
                self.edit_expense_inner(id, &update).await
            }
            other => other,
        }?;

        self.cache.invalidate_unit(result.entry.unit_id);
        tracing::info!(
            expense_id = %id,
            unit_id = %result.entry.unit_id,
            amount = %result.expense.amount,
            "expense edited"
        );
        Ok(result)
    }

    async fn edit_expense_inner(
        &self,
        id: ExpenseId,
        update: &UpdateExpenseInput,
    ) -> Result<RecordedExpense, RepositoryError> {
        let txn = self.db.begin().await?;

        let unit_id = expense_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?
            .unit_id;
        lock_unit(&txn, unit_id).await?;

        let expense = expense_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?;

        let amount = update.amount.unwrap_or(expense.amount);
        validate_amount(amount)?;

        let entry = self
            .reconcile_edit(&txn, unit_id, id.into_inner(), amount)
            .await?;

        let now = Utc::now();
        let mut active: expense_transactions::ActiveModel = expense.into();
        if let Some(category) = &update.category {
            active.category = Set(category.clone());
        }
        if let Some(description) = &update.description {
            active.description = Set(description.clone());
        }
        active.amount = Set(amount);
        active.updated_at = Set(now.into());
        let expense = active.update(&txn).await?;

        txn.commit().await?;
        Ok(RecordedExpense { expense, entry })
    }

    // ========== Deleting ==========

    /// Deletes an income transaction, splices its ledger entry out of the
    /// chain, and cascades the shift through every later entry.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` or a database error.
    pub async fn delete_income(&self, id: IncomeId) -> Result<(), RepositoryError> {
        let unit_id = match self.delete_income_inner(id).await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(income_id = %id, "retrying income deletion");
                self.delete_income_inner(id).await
            }
            other => other,
        }?;

        self.cache.invalidate_unit(unit_id);
        tracing::info!(income_id = %id, unit_id = %unit_id, "income deleted");
        Ok(())
    }

    async fn delete_income_inner(&self, id: IncomeId) -> Result<UnitId, RepositoryError> {
        let txn = self.db.begin().await?;

        let unit_id = income_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?
            .unit_id;
        lock_unit(&txn, unit_id).await?;

        let income = income_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?;

        self.reconcile_delete(&txn, unit_id, id.into_inner()).await?;
        income.delete(&txn).await?;

        txn.commit().await?;
        Ok(UnitId::from_uuid(unit_id))
    }

    /// Deletes an expense transaction, splices its ledger entry out of the
    /// chain, and cascades the shift through every later entry.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` or a database error.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<(), RepositoryError> {
        let unit_id = match self.delete_expense_inner(id).await {
            Err(err) if err.is_retryable() => {
                tracing::warn!(expense_id = %id, "retrying expense deletion");
                self.delete_expense_inner(id).await
            }
            other => other,
        }?;

        self.cache.invalidate_unit(unit_id);
        tracing::info!(expense_id = %id, unit_id = %unit_id, "expense deleted");
        Ok(())
    }

    async fn delete_expense_inner(&self, id: ExpenseId) -> Result<UnitId, RepositoryError> {
        let txn = self.db.begin().await?;

        let unit_id = expense_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?
            .unit_id;
        lock_unit(&txn, unit_id).await?;

        let expense = expense_transactions::Entity::find_by_id(id.into_inner())
            .one(&txn)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id.into_inner()))?;

        self.reconcile_delete(&txn, unit_id, id.into_inner()).await?;
        expense.delete(&txn).await?;

        txn.commit().await?;
        Ok(UnitId::from_uuid(unit_id))
    }

    // ========== Reading ==========

    /// Resolves a unit's current balance: the latest entry's
    /// `balance_after`, or the opening balance for an empty ledger.
    ///
    /// # Errors
    ///
    /// `UnitNotFound` or a database error.
    pub async fn current_balance(&self, unit_id: UnitId) -> Result<Decimal, RepositoryError> {
        let unit = crate::entities::units::Entity::find_by_id(unit_id.into_inner())
            .one(&self.db)
            .await?;
        if unit.is_none() {
            return Err(LedgerError::UnitNotFound(unit_id.into_inner()).into());
        }

        let opening = load_opening(&self.db, unit_id.into_inner()).await?;
        let last = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::UnitId.eq(unit_id.into_inner()))
            .order_by_desc(ledger_entries::Column::OccurredAt)
            .order_by_desc(ledger_entries::Column::Id)
            .limit(1)
            .one(&self.db)
            .await?;

        Ok(resolve_balance(opening, last.map(|e| e.balance_after)))
    }

    /// Lists a unit's income transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_income(
        &self,
        unit_id: UnitId,
        filter: TransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<income_transactions::Model>, RepositoryError> {
        let mut query = income_transactions::Entity::find()
            .filter(income_transactions::Column::UnitId.eq(unit_id.into_inner()));
        if let Some(from) = filter.from {
            query = query.filter(income_transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(income_transactions::Column::OccurredAt.lt(to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(income_transactions::Column::OccurredAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    /// Lists a unit's expense transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_expense(
        &self,
        unit_id: UnitId,
        filter: TransactionFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<expense_transactions::Model>, RepositoryError> {
        let mut query = expense_transactions::Entity::find()
            .filter(expense_transactions::Column::UnitId.eq(unit_id.into_inner()));
        if let Some(from) = filter.from {
            query = query.filter(expense_transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(expense_transactions::Column::OccurredAt.lt(to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(expense_transactions::Column::OccurredAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(rows, page, total))
    }

    // ========== Chain plumbing ==========

    /// Inserts a new entry into the unit's chain at its chronological
    /// position and shifts every later entry by the signed amount.
    async fn insert_chain_entry(
        &self,
        txn: &DatabaseTransaction,
        unit_id: UnitId,
        kind: EntryKind,
        source_id: Uuid,
        amount: Decimal,
        occurred_at: DateTime<Utc>,
    ) -> Result<LedgerEntry, RepositoryError> {
        let opening = load_opening(txn, unit_id.into_inner()).await?;
        let mut chain = load_chain(txn, unit_id.into_inner()).await?;

        let entry_id = LedgerEntryId::new();
        let index = chain.partition_point(|e| {
            (e.occurred_at, e.id.into_inner()) <= (occurred_at, entry_id.into_inner())
        });
        let prev_after = if index == 0 {
            opening
        } else {
            chain[index - 1].balance_after
        };
        let (balance_before, balance_after) = chain_next(prev_after, kind, amount);

        let signed = kind.signed(amount);
        for later in &mut chain[index..] {
            later.balance_before += signed;
            later.balance_after += signed;
        }

        let entry = LedgerEntry {
            id: entry_id,
            unit_id,
            kind,
            source_id,
            balance_before,
            balance_after,
            occurred_at,
        };
        chain.insert(index, entry.clone());
        check_chain(unit_id, opening, &chain)?;

        ledger_entries::ActiveModel {
            id: Set(entry_id.into_inner()),
            unit_id: Set(unit_id.into_inner()),
            kind: Set(kind.into()),
            source_id: Set(source_id),
            balance_before: Set(balance_before),
            balance_after: Set(balance_after),
            occurred_at: Set(occurred_at.into()),
            created_at: Set(Utc::now().into()),
        }
        .insert(txn)
        .await?;
        persist_entries(txn, &chain[index + 1..]).await?;

        Ok(entry)
    }

    /// Applies an amount edit to the entry backed by `source_id` and
    /// persists the cascaded chain.
    async fn reconcile_edit(
        &self,
        txn: &DatabaseTransaction,
        unit_id: Uuid,
        source_id: Uuid,
        new_amount: Decimal,
    ) -> Result<LedgerEntry, RepositoryError> {
        let opening = load_opening(txn, unit_id).await?;
        let mut chain = load_chain(txn, unit_id).await?;

        let index = chain
            .iter()
            .position(|e| e.source_id == source_id)
            .ok_or(LedgerError::EntryNotFound(source_id))?;

        cascade_edit(&mut chain, index, new_amount)?;
        check_chain(UnitId::from_uuid(unit_id), opening, &chain)?;

        persist_entries(txn, &chain[index..]).await?;
        Ok(chain[index].clone())
    }

    /// Splices the entry backed by `source_id` out of the chain and
    /// persists the cascaded shift.
    async fn reconcile_delete(
        &self,
        txn: &DatabaseTransaction,
        unit_id: Uuid,
        source_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let opening = load_opening(txn, unit_id).await?;
        let mut chain = load_chain(txn, unit_id).await?;

        let index = chain
            .iter()
            .position(|e| e.source_id == source_id)
            .ok_or(LedgerError::EntryNotFound(source_id))?;

        let removed = cascade_delete(&mut chain, index)?;
        check_chain(UnitId::from_uuid(unit_id), opening, &chain)?;

        ledger_entries::Entity::delete_by_id(removed.id.into_inner())
            .exec(txn)
            .await?;
        persist_entries(txn, &chain[index..]).await?;
        Ok(())
    }

}

/// Verifies the chain invariant before anything is persisted; a broken
/// chain aborts the whole transaction with full context logged.
fn check_chain(
    unit_id: UnitId,
    opening: Decimal,
    chain: &[LedgerEntry],
) -> Result<(), RepositoryError> {
    if let Err(err) = verify_chain(opening, chain) {
        tracing::error!(
            unit_id = %unit_id,
            opening = %opening,
            entries = chain.len(),
            error = %err,
            "chain invariant violated, aborting write"
        );
        return Err(err.into());
    }
    Ok(())
}

/// Loads a unit's opening balance, defaulting to zero when the row has not
/// been seeded yet.
pub async fn load_opening<C: ConnectionTrait>(
    conn: &C,
    unit_id: Uuid,
) -> Result<Decimal, RepositoryError> {
    let row = opening_balances::Entity::find()
        .filter(opening_balances::Column::UnitId.eq(unit_id))
        .one(conn)
        .await?;
    Ok(row.map_or(Decimal::ZERO, |r| r.amount))
}

/// Loads a unit's full chain, ascending by `(occurred_at, id)`.
pub async fn load_chain<C: ConnectionTrait>(
    conn: &C,
    unit_id: Uuid,
) -> Result<Vec<LedgerEntry>, RepositoryError> {
    let rows = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::UnitId.eq(unit_id))
        .order_by_asc(ledger_entries::Column::OccurredAt)
        .order_by_asc(ledger_entries::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Persists the balance fields of already-shifted entries.
async fn persist_entries(
    txn: &DatabaseTransaction,
    entries: &[LedgerEntry],
) -> Result<(), RepositoryError> {
    for entry in entries {
        ledger_entries::ActiveModel {
            id: Set(entry.id.into_inner()),
            balance_before: Set(entry.balance_before),
            balance_after: Set(entry.balance_after),
            ..Default::default()
        }
        .update(txn)
        .await?;
    }
    Ok(())
}
