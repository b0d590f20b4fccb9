//! Unit repository: business unit setup and opening balances.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, QueryOrder, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use kasdes_core::cache::AggregateCache;
use kasdes_core::ledger::validation::MAX_NAME_LEN;
use kasdes_core::ledger::{verify_chain, LedgerError};
use kasdes_core::unit::{Unit, UnitKind};
use kasdes_shared::types::UnitId;

use super::ledger::{load_chain, load_opening};
use super::{lock_unit, RepositoryError};
use crate::entities::{opening_balances, units};

/// Repository for unit reference data and opening balance adjustment.
#[derive(Clone)]
pub struct UnitRepository {
    db: DatabaseConnection,
    cache: Arc<AggregateCache>,
}

impl UnitRepository {
    /// Creates a new unit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, cache: Arc<AggregateCache>) -> Self {
        Self { db, cache }
    }

    /// Creates a unit together with its seeded opening balance row.
    ///
    /// # Errors
    ///
    /// Validation errors or a database error.
    pub async fn create_unit(
        &self,
        name: &str,
        kind: UnitKind,
        opening_balance: Decimal,
    ) -> Result<Unit, RepositoryError> {
        if name.trim().is_empty() {
            return Err(LedgerError::EmptyName.into());
        }
        if name.len() > MAX_NAME_LEN {
            return Err(LedgerError::FieldTooLong {
                field: "name",
                max: MAX_NAME_LEN,
            }
            .into());
        }
        if opening_balance < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount.into());
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();
        let unit_id = UnitId::new();

        let unit = units::ActiveModel {
            id: Set(unit_id.into_inner()),
            name: Set(name.trim().to_string()),
            kind: Set(kind.into()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        opening_balances::ActiveModel {
            id: Set(Uuid::now_v7()),
            unit_id: Set(unit_id.into_inner()),
            amount: Set(opening_balance),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        self.cache.invalidate_unit(unit_id);
        tracing::info!(unit_id = %unit_id, name = %unit.name, "unit created");
        Ok(unit.into())
    }

    /// Lists all units, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list_units(&self) -> Result<Vec<Unit>, RepositoryError> {
        let rows = units::Entity::find()
            .order_by_asc(units::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetches one unit.
    ///
    /// # Errors
    ///
    /// `UnitNotFound` or a database error.
    pub async fn get_unit(&self, id: UnitId) -> Result<Unit, RepositoryError> {
        let unit = units::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::UnitNotFound(id.into_inner()))?;
        Ok(unit.into())
    }

    /// Fetches a unit's opening balance.
    ///
    /// # Errors
    ///
    /// `UnitNotFound` or a database error.
    pub async fn get_opening_balance(&self, id: UnitId) -> Result<Decimal, RepositoryError> {
        // Verify existence so an unknown unit is a 404, not a zero.
        self.get_unit(id).await?;
        load_opening(&self.db, id.into_inner()).await
    }

    /// Adjusts a unit's opening balance (admin action).
    ///
    /// The whole chain hangs from the opening balance, so every entry's
    /// before/after shifts by the delta and all cached aggregates for the
    /// unit are invalidated.
    ///
    /// # Errors
    ///
    /// `UnitNotFound`, validation errors, or a database error.
    pub async fn set_opening_balance(
        &self,
        id: UnitId,
        amount: Decimal,
    ) -> Result<Decimal, RepositoryError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount.into());
        }

        let txn = self.db.begin().await?;
        lock_unit(&txn, id.into_inner()).await?;

        let old = load_opening(&txn, id.into_inner()).await?;
        let delta = amount - old;

        let now = Utc::now();
        match opening_balances::Entity::find()
            .filter(opening_balances::Column::UnitId.eq(id.into_inner()))
            .one(&txn)
            .await?
        {
            Some(row) => {
                let mut active: opening_balances::ActiveModel = row.into();
                active.amount = Set(amount);
                active.updated_at = Set(now.into());
                active.update(&txn).await?;
            }
            None => {
                opening_balances::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    unit_id: Set(id.into_inner()),
                    amount: Set(amount),
                    updated_at: Set(now.into()),
                }
                .insert(&txn)
                .await?;
            }
        }

        if delta != Decimal::ZERO {
            // Uniform shift preserves every entry's magnitude and kind
            // direction, so the chain stays well-formed by construction.
            txn.execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "UPDATE ledger_entries
                 SET balance_before = balance_before + $1,
                     balance_after = balance_after + $1
                 WHERE unit_id = $2",
                [delta.into(), id.into_inner().into()],
            ))
            .await?;
        }

        let chain = load_chain(&txn, id.into_inner()).await?;
        verify_chain(amount, &chain)?;

        txn.commit().await?;
        self.cache.invalidate_unit(id);
        tracing::info!(unit_id = %id, old = %old, new = %amount, "opening balance adjusted");
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rust_decimal_macros::dec;

    use super::*;

    // Validation runs before the first query, so a disconnected handle is
    // enough to exercise it.
    fn repo() -> UnitRepository {
        let cache = Arc::new(AggregateCache::new(4, Duration::from_secs(60)));
        UnitRepository::new(DatabaseConnection::Disconnected, cache)
    }

    #[tokio::test]
    async fn test_negative_opening_balance_is_rejected_on_create() {
        let err = repo()
            .create_unit("Lapangan Desa", UnitKind::SportsField, dec!(-1))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NEGATIVE_AMOUNT");
        assert_eq!(err.public_message(), "Amount must not be negative");
    }

    #[tokio::test]
    async fn test_negative_opening_balance_is_rejected_on_adjust() {
        let err = repo()
            .set_opening_balance(UnitId::new(), dec!(-0.01))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NEGATIVE_AMOUNT");
    }
}
