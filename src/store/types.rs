//! # 存储层数据结构

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{CredentialId, CredentialStatus};

/// 待导入的凭证
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCredential {
    pub ip: String,
    pub secret: String,
    #[serde(default)]
    pub valid_until: Option<NaiveDateTime>,
}

impl NewCredential {
    pub fn new(ip: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            secret: secret.into(),
            valid_until: None,
        }
    }

    #[must_use]
    pub const fn with_valid_until(mut self, valid_until: NaiveDateTime) -> Self {
        self.valid_until = Some(valid_until);
        self
    }
}

/// 批量导入中单条记录的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItemResult {
    pub ip: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CredentialId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub(crate) fn ok(ip: String, id: CredentialId) -> Self {
        Self {
            ip,
            success: true,
            id: Some(id),
            error: None,
        }
    }

    pub(crate) fn failed(ip: String, error: String) -> Self {
        Self {
            ip,
            success: false,
            id: None,
            error: Some(error),
        }
    }
}

/// 列表查询过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialFilter {
    pub status: Option<CredentialStatus>,
    /// IP 子串匹配
    pub ip: Option<String>,
}

/// 部分更新
///
/// `valid_until` 外层 `None` 表示不修改，`Some(None)` 表示清空
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CredentialPatch {
    pub ip: Option<String>,
    pub secret: Option<String>,
    pub valid_until: Option<Option<NaiveDateTime>>,
    pub status: Option<CredentialStatus>,
}

impl CredentialPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ip.is_none()
            && self.secret.is_none()
            && self.valid_until.is_none()
            && self.status.is_none()
    }
}

/// 凭证池统计（按需计算，不落库）
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolStatistics {
    pub total: u64,
    pub available: u64,
    pub using: u64,
    pub invalid: u64,
    pub blacklist: u64,
    pub total_use_count: u64,
    pub avg_use_count: f64,
}

impl PoolStatistics {
    pub(crate) fn tally(&mut self, status: CredentialStatus, count: u64) {
        match status {
            CredentialStatus::Available => self.available += count,
            CredentialStatus::InUse => self.using += count,
            CredentialStatus::Invalid => self.invalid += count,
            CredentialStatus::Blacklisted => self.blacklist += count,
        }
        self.total += count;
    }
}
