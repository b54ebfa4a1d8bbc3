//! `SeaORM` Entity for allowance_configs table.
//!
//! Each row is one immutable configuration version; the settings are kept
//! as a JSON document.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allowance_configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub config_json: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::settlement_runs::Entity")]
    SettlementRuns,
}

impl Related<super::settlement_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
