//! Report repository: cached report and dashboard reads.
//!
//! All aggregation math lives in `kasdes-core`; this layer fetches the
//! rows, feeds the pure aggregators, and routes every read through the
//! aggregate cache so repeated report views stay cheap.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use kasdes_core::cache::{Aggregate, AggregateCache, AggregateKey};
use kasdes_core::dashboard::{roll_up, DashboardSummary, UnitLedger};
use kasdes_core::ledger::{EntryKind, LedgerError};
use kasdes_core::reports::{DailyDetail, MonthlySummary, ReportService, SourceDescription};
use kasdes_shared::types::UnitId;

use super::ledger::{load_chain, load_opening};
use super::RepositoryError;
use crate::entities::{expense_transactions, income_transactions, units};

/// Repository for cached report and dashboard aggregates.
#[derive(Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    cache: Arc<AggregateCache>,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, cache: Arc<AggregateCache>) -> Self {
        Self { db, cache }
    }

    /// Builds (or serves from cache) a unit's monthly summary.
    ///
    /// # Errors
    ///
    /// `UnitNotFound` or a database error; compute failures fall back to
    /// the last cached value when one exists.
    pub async fn monthly_summary(
        &self,
        unit_id: UnitId,
    ) -> Result<Arc<MonthlySummary>, RepositoryError> {
        let key = AggregateKey::MonthlySummary { unit: unit_id };
        let aggregate = self
            .cache
            .get_or_compute_async(key, || async {
                self.require_unit(unit_id.into_inner()).await?;
                let entries = load_chain(&self.db, unit_id.into_inner()).await?;
                Ok::<_, RepositoryError>(Aggregate::Monthly(Arc::new(
                    ReportService::monthly_summary(unit_id, &entries),
                )))
            })
            .await?;

        match aggregate {
            Aggregate::Monthly(summary) => Ok(summary),
            Aggregate::Daily(_) | Aggregate::Dashboard(_) => {
                Err(LedgerError::Internal("cached aggregate kind mismatch".into()).into())
            }
        }
    }

    /// Builds (or serves from cache) a unit's daily detail for one month.
    ///
    /// # Errors
    ///
    /// `UnitNotFound`, an internal error for impossible dates, or a
    /// database error; compute failures fall back to the last cached value
    /// when one exists.
    pub async fn daily_detail(
        &self,
        unit_id: UnitId,
        year: i32,
        month: u32,
    ) -> Result<Arc<DailyDetail>, RepositoryError> {
        let key = AggregateKey::DailyDetail {
            unit: unit_id,
            year,
            month,
        };
        let aggregate = self
            .cache
            .get_or_compute_async(key, || async {
                self.require_unit(unit_id.into_inner()).await?;
                let (start, end) = month_bounds(year, month)?;

                let entries: Vec<kasdes_core::ledger::LedgerEntry> =
                    load_chain(&self.db, unit_id.into_inner())
                        .await?
                        .into_iter()
                        .filter(|e| e.occurred_at >= start && e.occurred_at < end)
                        .collect();
                let sources = self.load_sources(unit_id.into_inner(), start, end).await?;

                Ok::<_, RepositoryError>(Aggregate::Daily(Arc::new(ReportService::daily_detail(
                    unit_id, year, month, &entries, &sources,
                ))))
            })
            .await?;

        match aggregate {
            Aggregate::Daily(detail) => Ok(detail),
            Aggregate::Monthly(_) | Aggregate::Dashboard(_) => {
                Err(LedgerError::Internal("cached aggregate kind mismatch".into()).into())
            }
        }
    }

    /// Builds (or serves from cache) the cross-unit dashboard.
    ///
    /// # Errors
    ///
    /// A database error; compute failures fall back to the last cached
    /// value when one exists.
    pub async fn dashboard(&self) -> Result<Arc<DashboardSummary>, RepositoryError> {
        let aggregate = self
            .cache
            .get_or_compute_async(AggregateKey::Dashboard, || async {
                let unit_rows = units::Entity::find()
                    .order_by_asc(units::Column::Name)
                    .all(&self.db)
                    .await?;

                let mut ledgers = Vec::with_capacity(unit_rows.len());
                for row in unit_rows {
                    let opening = load_opening(&self.db, row.id).await?;
                    let entries = load_chain(&self.db, row.id).await?;
                    ledgers.push(UnitLedger {
                        unit: row.into(),
                        opening_balance: opening,
                        entries,
                    });
                }

                Ok::<_, RepositoryError>(Aggregate::Dashboard(Arc::new(roll_up(ledgers, Utc::now()))))
            })
            .await?;

        match aggregate {
            Aggregate::Dashboard(summary) => Ok(summary),
            Aggregate::Monthly(_) | Aggregate::Daily(_) => {
                Err(LedgerError::Internal("cached aggregate kind mismatch".into()).into())
            }
        }
    }

    async fn require_unit(&self, unit_id: Uuid) -> Result<(), RepositoryError> {
        let unit = units::Entity::find_by_id(unit_id).one(&self.db).await?;
        if unit.is_none() {
            return Err(LedgerError::UnitNotFound(unit_id).into());
        }
        Ok(())
    }

    /// Loads description sources for a unit within a time window.
    async fn load_sources(
        &self,
        unit_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<SourceDescription>, RepositoryError> {
        let incomes = income_transactions::Entity::find()
            .filter(income_transactions::Column::UnitId.eq(unit_id))
            .filter(income_transactions::Column::OccurredAt.gte(start))
            .filter(income_transactions::Column::OccurredAt.lt(end))
            .all(&self.db)
            .await?;
        let expenses = expense_transactions::Entity::find()
            .filter(expense_transactions::Column::UnitId.eq(unit_id))
            .filter(expense_transactions::Column::OccurredAt.gte(start))
            .filter(expense_transactions::Column::OccurredAt.lt(end))
            .all(&self.db)
            .await?;

        let mut sources = Vec::with_capacity(incomes.len() + expenses.len());
        for income in incomes {
            sources.push(SourceDescription {
                source_id: income.id,
                unit_id: UnitId::from_uuid(income.unit_id),
                kind: EntryKind::Income,
                description: income.display_description(),
                occurred_at: income.occurred_at.with_timezone(&Utc),
                updated_at: income.updated_at.with_timezone(&Utc),
            });
        }
        for expense in expenses {
            sources.push(SourceDescription {
                source_id: expense.id,
                unit_id: UnitId::from_uuid(expense.unit_id),
                kind: EntryKind::Expense,
                description: expense.description.clone(),
                occurred_at: expense.occurred_at.with_timezone(&Utc),
                updated_at: expense.updated_at.with_timezone(&Utc),
            });
        }
        Ok(sources)
    }
}

/// Computes the UTC half-open interval covering a calendar month.
fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), RepositoryError> {
    let start_date = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LedgerError::Internal(format!("invalid month {year}-{month}")))?;
    let end_date = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| LedgerError::Internal(format!("invalid month {year}-{month}")))?;

    let start = Utc.from_utc_datetime(&start_date.and_time(chrono::NaiveTime::MIN));
    let end = Utc.from_utc_datetime(&end_date.and_time(chrono::NaiveTime::MIN));
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_month_bounds() {
        let (start, end) = month_bounds(2026, 8).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-08-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-09-01T00:00:00+00:00");
        assert_eq!(start.month(), 8);

        let (start, end) = month_bounds(2026, 12).unwrap();
        assert_eq!(start.year(), 2026);
        assert_eq!(end.year(), 2027);
        assert_eq!(end.month(), 1);

        assert!(month_bounds(2026, 13).is_err());
        assert!(month_bounds(2026, 0).is_err());
    }
}
