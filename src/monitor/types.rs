//! # 健康监控数据结构

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::store::PoolStatistics;
use crate::types::AlertLevel;

/// 由统计触发的告警条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertCondition {
    pub level: AlertLevel,
    #[serde(rename = "type")]
    pub alert_type: &'static str,
    pub message: String,
}

impl AlertCondition {
    pub fn new(level: AlertLevel, alert_type: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            alert_type,
            message: message.into(),
        }
    }
}

/// 池健康分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthClass {
    Critical,
    Warning,
    Healthy,
}

impl HealthClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Healthy => "HEALTHY",
        }
    }
}

/// 一次健康检查的结果
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckReport {
    pub stats: PoolStatistics,
    /// 本次统计触发的全部条件
    pub alerts: Vec<AlertCondition>,
    /// 其中新写入的告警数，其余已有未处理的同类告警
    pub created_alerts: usize,
    pub report: String,
    pub timestamp: NaiveDateTime,
}

/// 某一时刻的池状态
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub stats: PoolStatistics,
    /// 未处理告警数
    pub alert_count: u64,
    /// 出借中占比（百分比，两位小数）
    pub utilization_rate: f64,
    /// 可用占比（百分比，两位小数）
    pub availability_rate: f64,
    pub health: HealthClass,
    pub timestamp: NaiveDateTime,
}

/// 按天汇总的告警
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAlertSummary {
    pub date: NaiveDate,
    pub total_alerts: u64,
    pub low_level: u64,
    pub medium_level: u64,
    pub high_level: u64,
    pub resolved: u64,
}

impl DailyAlertSummary {
    pub(crate) const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_alerts: 0,
            low_level: 0,
            medium_level: 0,
            high_level: 0,
            resolved: 0,
        }
    }
}
