//! Tariff domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasdes_shared::types::{TariffId, UnitId};

/// A pricing rule for one category of a unit's income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tariff {
    /// Unique identifier.
    pub id: TariffId,
    /// The unit this tariff belongs to.
    pub unit_id: UnitId,
    /// Category, e.g. "hourly_rental", "per_m3".
    pub category: String,
    /// Price per unit of measure.
    pub rate: Decimal,
    /// Unit of measure, e.g. "hour", "night", "m3".
    pub unit_of_measure: String,
    /// Creation timestamp; the newest tariff per (unit, category) wins.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a tariff.
#[derive(Debug, Clone)]
pub struct TariffInput {
    /// The unit this tariff belongs to.
    pub unit_id: UnitId,
    /// Category name.
    pub category: String,
    /// Price per unit of measure (positive).
    pub rate: Decimal,
    /// Unit of measure.
    pub unit_of_measure: String,
}
