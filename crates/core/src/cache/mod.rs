//! Cache for expensive report aggregates.
//!
//! Keys are typed so invalidation can target exactly the aggregates a
//! mutation made stale. Mutation paths invalidate through the repository
//! layer, so no caller can forget.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use kasdes_shared::types::UnitId;

use crate::dashboard::DashboardSummary;
use crate::reports::{DailyDetail, MonthlySummary};

/// Identity of one cached aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKey {
    /// A unit's monthly summary.
    MonthlySummary {
        /// The unit reported on.
        unit: UnitId,
    },
    /// A unit's daily detail for one calendar month.
    DailyDetail {
        /// The unit reported on.
        unit: UnitId,
        /// Calendar year.
        year: i32,
        /// Calendar month, 1-12.
        month: u32,
    },
    /// The cross-unit dashboard.
    Dashboard,
}

impl AggregateKey {
    /// The unit this aggregate belongs to, if it is unit-scoped.
    #[must_use]
    pub const fn unit(&self) -> Option<UnitId> {
        match self {
            Self::MonthlySummary { unit } | Self::DailyDetail { unit, .. } => Some(*unit),
            Self::Dashboard => None,
        }
    }
}

/// A cached aggregate value.
#[derive(Debug, Clone)]
pub enum Aggregate {
    /// Monthly summary payload.
    Monthly(Arc<MonthlySummary>),
    /// Daily detail payload.
    Daily(Arc<DailyDetail>),
    /// Dashboard payload.
    Dashboard(Arc<DashboardSummary>),
}

/// TTL cache over report aggregates with explicit per-unit invalidation.
///
/// A second capacity-only tier keeps the last good value per key past its
/// TTL, so a failed recompute can serve the previous aggregate instead of
/// an error. Explicit invalidation drops both tiers since a mutation makes
/// the old value wrong, not merely old.
pub struct AggregateCache {
    fresh: Cache<AggregateKey, Aggregate>,
    last_good: Cache<AggregateKey, Aggregate>,
}

impl AggregateCache {
    /// Creates a cache with the given capacity and TTL.
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let fresh = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        let last_good = Cache::builder()
            .max_capacity(max_capacity)
            .support_invalidation_closures()
            .build();
        Self { fresh, last_good }
    }

    /// Returns the cached aggregate for `key`, computing and storing it on
    /// a miss.
    ///
    /// # Errors
    ///
    /// Propagates the compute error only when no previous good value is
    /// available as a fallback.
    pub fn get_or_compute<E, F>(&self, key: AggregateKey, compute: F) -> Result<Aggregate, E>
    where
        F: FnOnce() -> Result<Aggregate, E>,
    {
        if let Some(hit) = self.fresh.get(&key) {
            return Ok(hit);
        }

        match compute() {
            Ok(value) => {
                self.fresh.insert(key, value.clone());
                self.last_good.insert(key, value.clone());
                Ok(value)
            }
            Err(err) => self.last_good.get(&key).map_or(Err(err), Ok),
        }
    }

    /// Async variant of [`Self::get_or_compute`] for computes that hit the
    /// database. Same semantics, including the stale fallback.
    ///
    /// # Errors
    ///
    /// Propagates the compute error only when no previous good value is
    /// available as a fallback.
    pub async fn get_or_compute_async<E, F, Fut>(
        &self,
        key: AggregateKey,
        compute: F,
    ) -> Result<Aggregate, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<Aggregate, E>>,
    {
        if let Some(hit) = self.fresh.get(&key) {
            return Ok(hit);
        }

        match compute().await {
            Ok(value) => {
                self.fresh.insert(key, value.clone());
                self.last_good.insert(key, value.clone());
                Ok(value)
            }
            Err(err) => self.last_good.get(&key).map_or(Err(err), Ok),
        }
    }

    /// Drops every aggregate affected by a mutation of `unit`: the unit's
    /// own aggregates and the cross-unit dashboard.
    pub fn invalidate_unit(&self, unit: UnitId) {
        // invalidate_entries_if only fails before the first closure is
        // registered; support_invalidation_closures is set at build time.
        let _ = self
            .fresh
            .invalidate_entries_if(move |key, _| key.unit() == Some(unit));
        let _ = self
            .last_good
            .invalidate_entries_if(move |key, _| key.unit() == Some(unit));
        self.fresh.invalidate(&AggregateKey::Dashboard);
        self.last_good.invalidate(&AggregateKey::Dashboard);
    }

    /// Drops everything. Used after opening balance adjustments and by
    /// tests.
    pub fn invalidate_all(&self) {
        self.fresh.invalidate_all();
        self.last_good.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{MonthlySummary, ReportTotals};

    fn summary(unit: UnitId) -> Aggregate {
        Aggregate::Monthly(Arc::new(MonthlySummary {
            unit_id: unit,
            months: Vec::new(),
            totals: ReportTotals::zero(),
        }))
    }

    fn cache() -> AggregateCache {
        AggregateCache::new(16, Duration::from_secs(300))
    }

    #[test]
    fn test_computes_once_then_hits() {
        let cache = cache();
        let unit = UnitId::new();
        let key = AggregateKey::MonthlySummary { unit };
        let mut computes = 0;

        for _ in 0..3 {
            let result: Result<_, ()> = cache.get_or_compute(key, || {
                computes += 1;
                Ok(summary(unit))
            });
            assert!(result.is_ok());
        }
        assert_eq!(computes, 1);
    }

    #[test]
    fn test_failed_compute_falls_back_to_last_good() {
        let cache = cache();
        let unit = UnitId::new();
        let key = AggregateKey::MonthlySummary { unit };

        cache
            .get_or_compute::<(), _>(key, || Ok(summary(unit)))
            .unwrap();
        // Expire the fresh tier without touching last_good.
        cache.fresh.invalidate(&key);
        cache.fresh.run_pending_tasks();

        let result = cache.get_or_compute::<&str, _>(key, || Err("db down"));
        assert!(matches!(result, Ok(Aggregate::Monthly(_))));
    }

    #[test]
    fn test_failed_compute_without_fallback_errors() {
        let cache = cache();
        let key = AggregateKey::Dashboard;
        let result = cache.get_or_compute(key, || Err("db down"));
        assert_eq!(result.unwrap_err(), "db down");
    }

    #[test]
    fn test_invalidate_unit_drops_both_tiers_and_dashboard() {
        let cache = cache();
        let unit = UnitId::new();
        let other = UnitId::new();
        let unit_key = AggregateKey::MonthlySummary { unit };
        let other_key = AggregateKey::MonthlySummary { unit: other };

        cache
            .get_or_compute::<(), _>(unit_key, || Ok(summary(unit)))
            .unwrap();
        cache
            .get_or_compute::<(), _>(other_key, || Ok(summary(other)))
            .unwrap();

        cache.invalidate_unit(unit);
        cache.fresh.run_pending_tasks();
        cache.last_good.run_pending_tasks();

        // The mutated unit recomputes and gets no stale fallback.
        assert!(cache.fresh.get(&unit_key).is_none());
        let fallback = cache.get_or_compute(unit_key, || Err("down"));
        assert_eq!(fallback.unwrap_err(), "down");

        // The other unit's aggregate is untouched.
        assert!(cache.fresh.get(&other_key).is_some());
    }
}
