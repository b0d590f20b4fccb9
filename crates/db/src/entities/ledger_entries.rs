//! `SeaORM` Entity for the ledger_entries table.
//!
//! Rows are only ever written through the ledger repository, which keeps
//! the per-unit chain invariant intact.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub unit_id: Uuid,
    pub kind: EntryKind,
    pub source_id: Uuid,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub occurred_at: DateTimeWithTimeZone,
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

impl From<Model> for kasdes_core::ledger::LedgerEntry {
    fn from(model: Model) -> Self {
        Self {
            id: kasdes_shared::types::LedgerEntryId::from_uuid(model.id),
            unit_id: kasdes_shared::types::UnitId::from_uuid(model.unit_id),
            kind: model.kind.into(),
            source_id: model.source_id,
            balance_before: model.balance_before,
            balance_after: model.balance_after,
            occurred_at: model.occurred_at.with_timezone(&chrono::Utc),
        }
    }
}
