//! # 凭证池实体定义
//!
//! 凭证（Cookie）池表的 Sea-ORM 实体模型，每个网络身份（ip）一行

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 凭证实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credentials")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub ip: String,
    #[sea_orm(column_type = "Text")]
    pub secret: String,
    /// 0-可用 1-使用中 2-已失效 3-黑名单
    pub status: i16,
    pub in_use: bool,
    pub last_used_at: Option<DateTime>,
    pub last_checked_at: Option<DateTime>,
    pub use_count: i32,
    pub valid_until: Option<DateTime>,
    pub error_message: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
