//! # 使用周期实体定义
//!
//! 一个周期对应一次采集活动的时间窗口

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 使用周期实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usage_cycles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub start_time: DateTime,
    pub end_time: DateTime,
    pub target_count: Option<i32>,
    pub current_count: i32,
    pub max_credentials: i32,
    /// 0-进行中 1-已完成
    pub status: i16,
    pub completed_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cycle_progress::Entity")]
    CycleProgress,
}

impl Related<super::cycle_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CycleProgress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
