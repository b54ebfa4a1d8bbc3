//! `SeaORM` Entity for allowance_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allowance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub run_id: Uuid,
    pub student_id: String,
    pub allowance_type: String,
    pub period_start: Date,
    pub period_end: Date,
    pub amount_usd: String,
    pub amount_local: String,
    pub fx_rate: String,
    pub currency: String,
    pub rule_id: String,
    pub description: String,
    pub metadata_json: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::settlement_runs::Entity",
        from = "Column::RunId",
        to = "super::settlement_runs::Column::Id"
    )]
    SettlementRuns,
}

impl Related<super::settlement_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementRuns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
