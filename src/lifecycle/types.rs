//! # 生命周期操作的返回结构

use serde::Serialize;

use crate::store::{BatchItemResult, PoolStatistics};
use crate::types::CredentialId;

/// 批量导入汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub details: Vec<BatchItemResult>,
}

impl ImportSummary {
    pub(crate) fn from_details(details: Vec<BatchItemResult>) -> Self {
        let success = details.iter().filter(|d| d.success).count();
        Self {
            total: details.len(),
            success,
            failed: details.len() - success,
            details,
        }
    }
}

/// 出借给调用方的凭证
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutLease {
    pub id: CredentialId,
    pub ip: String,
    pub secret: String,
    /// 本次出借之后的累计次数
    pub use_count: i32,
}

/// 单个凭证的校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// 批量校验中的单条结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchValidationItem {
    pub id: CredentialId,
    /// 读取凭证本身失败时为空
    pub ip: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 释放、拉黑等操作返回的凭证标识
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialRef {
    pub id: CredentialId,
    pub ip: String,
}

/// 对外展示的池统计，平均使用次数保留两位小数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsSummary {
    pub total: u64,
    pub available: u64,
    pub using: u64,
    pub invalid: u64,
    pub blacklist: u64,
    pub total_use_count: u64,
    pub avg_use_count: String,
}

impl From<PoolStatistics> for StatisticsSummary {
    fn from(stats: PoolStatistics) -> Self {
        Self {
            total: stats.total,
            available: stats.available,
            using: stats.using,
            invalid: stats.invalid,
            blacklist: stats.blacklist,
            total_use_count: stats.total_use_count,
            avg_use_count: format!("{:.2}", stats.avg_use_count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_summary_counts() {
        let summary = ImportSummary::from_details(vec![
            BatchItemResult::ok("1.1.1.1".to_string(), 1),
            BatchItemResult::failed("1.1.1.1".to_string(), "重复".to_string()),
        ]);
        assert_eq!((summary.total, summary.success, summary.failed), (2, 1, 1));
    }

    #[test]
    fn test_statistics_summary_formats_average() {
        let summary = StatisticsSummary::from(PoolStatistics {
            total: 3,
            total_use_count: 2,
            avg_use_count: 2.0 / 3.0,
            ..PoolStatistics::default()
        });
        assert_eq!(summary.avg_use_count, "0.67");
        assert_eq!(StatisticsSummary::from(PoolStatistics::default()).avg_use_count, "0.00");
    }
}
