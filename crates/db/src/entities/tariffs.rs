//! `SeaORM` Entity for the tariffs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tariffs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub unit_id: Uuid,
    pub category: String,
    pub rate: Decimal,
    pub unit_of_measure: String,
    pub created_at: DateTimeWithTimeZone,
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

impl From<Model> for kasdes_core::tariff::Tariff {
    fn from(model: Model) -> Self {
        Self {
            id: kasdes_shared::types::TariffId::from_uuid(model.id),
            unit_id: kasdes_shared::types::UnitId::from_uuid(model.unit_id),
            category: model.category,
            rate: model.rate,
            unit_of_measure: model.unit_of_measure,
            created_at: model.created_at.with_timezone(&chrono::Utc),
        }
    }
}
