//! Database enum mappings.
//!
//! Each enum mirrors a Postgres enum type and converts to and from its
//! domain counterpart in `kasdes-core`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of business unit (`unit_kind` Postgres enum).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "unit_kind")]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Sports field rental.
    #[sea_orm(string_value = "sports_field")]
    SportsField,
    /// Campground.
    #[sea_orm(string_value = "campground")]
    Campground,
    /// Village kiosk.
    #[sea_orm(string_value = "kiosk")]
    Kiosk,
    /// Water utility.
    #[sea_orm(string_value = "water_utility")]
    WaterUtility,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<kasdes_core::unit::UnitKind> for UnitKind {
    fn from(kind: kasdes_core::unit::UnitKind) -> Self {
        match kind {
            kasdes_core::unit::UnitKind::SportsField => Self::SportsField,
            kasdes_core::unit::UnitKind::Campground => Self::Campground,
            kasdes_core::unit::UnitKind::Kiosk => Self::Kiosk,
            kasdes_core::unit::UnitKind::WaterUtility => Self::WaterUtility,
            kasdes_core::unit::UnitKind::Other => Self::Other,
        }
    }
}

impl From<UnitKind> for kasdes_core::unit::UnitKind {
    fn from(kind: UnitKind) -> Self {
        match kind {
            UnitKind::SportsField => Self::SportsField,
            UnitKind::Campground => Self::Campground,
            UnitKind::Kiosk => Self::Kiosk,
            UnitKind::WaterUtility => Self::WaterUtility,
            UnitKind::Other => Self::Other,
        }
    }
}

/// Kind of ledger entry (`entry_kind` Postgres enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_kind")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money coming in.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<kasdes_core::ledger::EntryKind> for EntryKind {
    fn from(kind: kasdes_core::ledger::EntryKind) -> Self {
        match kind {
            kasdes_core::ledger::EntryKind::Income => Self::Income,
            kasdes_core::ledger::EntryKind::Expense => Self::Expense,
        }
    }
}

impl From<EntryKind> for kasdes_core::ledger::EntryKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Income => Self::Income,
            EntryKind::Expense => Self::Expense,
        }
    }
}
