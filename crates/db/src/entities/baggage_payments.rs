//! `SeaORM` Entity for baggage_payments table.
//!
//! One row per student whose excess baggage allowance has been paid.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "baggage_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: String,
    pub run_id: Uuid,
    pub period: String,
    pub paid_at: DateTimeUtc,
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
