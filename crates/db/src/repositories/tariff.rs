//! Tariff repository.
//!
//! Tariffs never rewrite history: income transactions snapshot their rate
//! at recording time, so tariff changes need no cache invalidation.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};

use kasdes_core::ledger::LedgerError;
use kasdes_core::tariff::{Tariff, TariffInput, TariffService};
use kasdes_shared::types::{TariffId, UnitId};

use super::RepositoryError;
use crate::entities::{tariffs, units};

/// Repository for tariff CRUD.
#[derive(Clone)]
pub struct TariffRepository {
    db: DatabaseConnection,
}

impl TariffRepository {
    /// Creates a new tariff repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a tariff. The new tariff becomes the current one for its
    /// (unit, category) pair.
    ///
    /// # Errors
    ///
    /// Validation errors, `UnitNotFound`, or a database error.
    pub async fn create(&self, input: TariffInput) -> Result<Tariff, RepositoryError> {
        TariffService::validate(&input)?;

        let unit = units::Entity::find_by_id(input.unit_id.into_inner())
            .one(&self.db)
            .await?;
        if unit.is_none() {
            return Err(LedgerError::UnitNotFound(input.unit_id.into_inner()).into());
        }

        let tariff = tariffs::ActiveModel {
            id: Set(TariffId::new().into_inner()),
            unit_id: Set(input.unit_id.into_inner()),
            category: Set(input.category.trim().to_string()),
            rate: Set(input.rate),
            unit_of_measure: Set(input.unit_of_measure.trim().to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(
            tariff_id = %tariff.id,
            unit_id = %tariff.unit_id,
            category = %tariff.category,
            rate = %tariff.rate,
            "tariff created"
        );
        Ok(tariff.into())
    }

    /// Lists a unit's tariffs, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query fails.
    pub async fn list(&self, unit_id: UnitId) -> Result<Vec<Tariff>, RepositoryError> {
        let rows = tariffs::Entity::find()
            .filter(tariffs::Column::UnitId.eq(unit_id.into_inner()))
            .order_by_desc(tariffs::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Resolves the current tariff for a category.
    ///
    /// # Errors
    ///
    /// `TariffNotFound` when the category has no tariff on the unit.
    pub async fn current(
        &self,
        unit_id: UnitId,
        category: &str,
    ) -> Result<Tariff, RepositoryError> {
        let tariffs = self.list(unit_id).await?;
        TariffService::current(&tariffs, category)
            .cloned()
            .ok_or_else(|| {
                LedgerError::TariffNotFound {
                    unit_id: unit_id.into_inner(),
                    category: category.to_string(),
                }
                .into()
            })
    }

    /// Deletes a tariff.
    ///
    /// # Errors
    ///
    /// `TariffNotFound` or a database error.
    pub async fn delete(&self, id: TariffId) -> Result<(), RepositoryError> {
        let tariff = tariffs::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(LedgerError::TariffNotFoundById(id.into_inner()))?;

        tariff.delete(&self.db).await?;
        tracing::info!(tariff_id = %id, "tariff deleted");
        Ok(())
    }
}
