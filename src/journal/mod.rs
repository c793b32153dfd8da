//! # 凭证操作日志
//!
//! 记录每次成功的状态变更与失败的校验。写日志是尽力而为的：
//! 写入失败只打一条告警日志，不影响调用方的操作结果

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use entity::credential_logs::{self, Column};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::lwarn;
use crate::types::CredentialId;

/// 消息列的长度上限（字符）
const MESSAGE_LIMIT: usize = 500;

/// 日志动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JournalAction {
    Import,
    Checkout,
    Release,
    Check,
    Blacklist,
    Update,
    Delete,
    Reclaim,
}

impl JournalAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Checkout => "checkout",
            Self::Release => "release",
            Self::Check => "check",
            Self::Blacklist => "blacklist",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Reclaim => "reclaim",
        }
    }
}

impl fmt::Display for JournalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 操作结果，落库为 0 成功 / 1 失败
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalOutcome {
    Success,
    Failure,
}

impl JournalOutcome {
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// 凭证操作日志服务
#[derive(Clone)]
pub struct OperationJournal {
    db: Arc<DatabaseConnection>,
}

impl OperationJournal {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 追加一条日志，失败时只记录告警
    pub async fn record(
        &self,
        credential_id: CredentialId,
        action: JournalAction,
        outcome: JournalOutcome,
        message: Option<&str>,
    ) {
        let entry = credential_logs::ActiveModel {
            credential_id: Set(credential_id),
            action: Set(action.as_str().to_string()),
            status: Set(outcome.code()),
            message: Set(message.map(|m| m.chars().take(MESSAGE_LIMIT).collect())),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        if let Err(e) = entry.insert(&*self.db).await {
            lwarn!(
                "system",
                LogStage::Maintenance,
                LogComponent::Journal,
                "record_failed",
                "写入凭证操作日志失败",
                credential_id = credential_id,
                action = %action,
                error = %e
            );
        }
    }

    /// 某个凭证最近的日志，新的在前
    pub async fn recent(
        &self,
        credential_id: CredentialId,
        limit: u64,
    ) -> Result<Vec<credential_logs::Model>> {
        Ok(credential_logs::Entity::find()
            .filter(Column::CredentialId.eq(credential_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&*self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_db;

    #[tokio::test]
    async fn test_recent_is_newest_first_and_scoped() {
        let journal = OperationJournal::new(create_test_db().await);
        journal
            .record(1, JournalAction::Import, JournalOutcome::Success, None)
            .await;
        journal
            .record(1, JournalAction::Check, JournalOutcome::Failure, Some("Cookie已失效"))
            .await;
        journal
            .record(2, JournalAction::Checkout, JournalOutcome::Success, None)
            .await;

        let entries = journal.recent(1, 10).await.unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["check", "import"]);
        assert_eq!(entries[0].status, 1);
        assert_eq!(entries[0].message.as_deref(), Some("Cookie已失效"));

        assert_eq!(journal.recent(1, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_long_messages_are_truncated() {
        let journal = OperationJournal::new(create_test_db().await);
        let long = "失".repeat(MESSAGE_LIMIT + 20);
        journal
            .record(7, JournalAction::Check, JournalOutcome::Failure, Some(&long))
            .await;

        let entry = journal.recent(7, 1).await.unwrap().remove(0);
        assert_eq!(entry.message.unwrap().chars().count(), MESSAGE_LIMIT);
    }
}
