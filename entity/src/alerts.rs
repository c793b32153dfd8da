//! # 告警实体定义
//!
//! 健康检查生成的运营告警

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 告警实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// 1-低 2-中 3-高
    pub level: i16,
    #[sea_orm(column_name = "type")]
    pub alert_type: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// 0-未处理 1-已处理
    pub status: i16,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
