//! `SeaORM` Entity for the income_transactions table.
//!
//! The rate is snapshotted at recording time so later tariff changes never
//! rewrite history; edits recompute the amount from the stored rate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "income_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub unit_id: Uuid,
    pub tenant: String,
    pub category: String,
    pub rate: Decimal,
    pub quantity: Decimal,
    pub amount: Decimal,
    pub note: Option<String>,
    pub occurred_at: DateTimeWithTimeZone,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::units::Entity",
        from = "Column::UnitId",
        to = "super::units::Column::Id"
    )]
    Units,
}

impl Related<super::units::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Units.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Display description used by reports: "tenant - category".
    #[must_use]
    pub fn display_description(&self) -> String {
        format!("{} - {}", self.tenant, self.category)
    }
}
