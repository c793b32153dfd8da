//! # 凭证操作日志实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 凭证操作日志
///
/// 不与 `credentials` 建立外键，凭证删除后日志依然保留
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credential_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub credential_id: i32,
    pub action: String,
    /// 0-成功 1-失败
    pub status: i16,
    pub message: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
