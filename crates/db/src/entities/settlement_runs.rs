//! `SeaORM` Entity for settlement_runs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "settlement_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeUtc,
    pub config_version: i32,
    pub period: String,
    pub fx_rate: String,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::allowance_configs::Entity",
        from = "Column::ConfigVersion",
        to = "super::allowance_configs::Column::Version"
    )]
    AllowanceConfigs,
    #[sea_orm(has_many = "super::allowance_records::Entity")]
    AllowanceRecords,
}

impl Related<super::allowance_configs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AllowanceConfigs.def()
    }
}

impl Related<super::allowance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AllowanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
