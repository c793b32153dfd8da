//! # 周期进度实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 周期内单次凭证使用记录
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cycle_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cycle_id: i32,
    pub credential_id: i32,
    pub used_at: DateTime,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::usage_cycles::Entity",
        from = "Column::CycleId",
        to = "super::usage_cycles::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    UsageCycle,
}

impl Related<super::usage_cycles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageCycle.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
