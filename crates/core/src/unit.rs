//! Business unit reference data.
//!
//! A unit is an independently accounted business line of the cooperative
//! (sports field, campground, kiosk, water utility). Units are immutable
//! after setup and own all other entities through their id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kasdes_shared::types::UnitId;

/// Kind of business unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Sports field rental.
    SportsField,
    /// Campground.
    Campground,
    /// Village kiosk.
    Kiosk,
    /// Water utility.
    WaterUtility,
    /// Anything else.
    Other,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SportsField => "sports_field",
            Self::Campground => "campground",
            Self::Kiosk => "kiosk",
            Self::WaterUtility => "water_utility",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for UnitKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sports_field" => Ok(Self::SportsField),
            "campground" => Ok(Self::Campground),
            "kiosk" => Ok(Self::Kiosk),
            "water_utility" => Ok(Self::WaterUtility),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown unit kind: {s}")),
        }
    }
}

/// A business unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Display name, e.g. "Lapangan Desa".
    pub name: String,
    /// Kind of business line.
    pub kind: UnitKind,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_unit_kind_roundtrip() {
        for kind in [
            UnitKind::SportsField,
            UnitKind::Campground,
            UnitKind::Kiosk,
            UnitKind::WaterUtility,
            UnitKind::Other,
        ] {
            assert_eq!(UnitKind::from_str(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn test_unit_kind_unknown() {
        assert!(UnitKind::from_str("bakery").is_err());
    }
}
