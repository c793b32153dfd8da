//! # 告警规则与健康分级
//!
//! 纯函数，只依赖池统计

use std::fmt::Write;

use super::types::{AlertCondition, HealthClass};
use crate::store::PoolStatistics;
use crate::types::{AlertLevel, ratio_as_f64, ratio_as_percentage};

/// 失效率告警阈值
const INVALID_RATE_THRESHOLD: f64 = 0.3;
/// 黑名单比例告警阈值
const BLACKLIST_RATE_THRESHOLD: f64 = 0.2;
/// 失效率超过该值判为警告
const WARNING_INVALID_RATE: f64 = 0.5;

/// 根据当前统计得出应当存在的告警
#[must_use]
pub fn evaluate_alerts(stats: &PoolStatistics) -> Vec<AlertCondition> {
    let mut alerts = Vec::new();

    if stats.total == 0 {
        alerts.push(AlertCondition::new(
            AlertLevel::High,
            "EMPTY_POOL",
            "Cookie池为空，无可用Cookie",
        ));
    }

    if stats.available == 0 && stats.total > 0 {
        alerts.push(AlertCondition::new(
            AlertLevel::Medium,
            "NO_AVAILABLE",
            "没有可用的Cookie",
        ));
    }

    if let Some(rate) =
        ratio_as_f64(stats.invalid, stats.total).filter(|rate| *rate > INVALID_RATE_THRESHOLD)
    {
        alerts.push(AlertCondition::new(
            AlertLevel::Medium,
            "HIGH_INVALID_RATE",
            format!("失效率过高: {:.2}%", rate * 100.0),
        ));
    }

    if let Some(rate) =
        ratio_as_f64(stats.blacklist, stats.total).filter(|rate| *rate > BLACKLIST_RATE_THRESHOLD)
    {
        alerts.push(AlertCondition::new(
            AlertLevel::Low,
            "HIGH_BLACKLIST_RATE",
            format!("黑名单比例较高: {:.2}%", rate * 100.0),
        ));
    }

    alerts
}

/// 健康分级：空池为严重；无可用或失效率过半为警告
#[must_use]
pub fn classify_health(stats: &PoolStatistics) -> HealthClass {
    if stats.total == 0 {
        return HealthClass::Critical;
    }

    let invalid_rate = ratio_as_f64(stats.invalid, stats.total).unwrap_or(0.0);
    if stats.available == 0 || invalid_rate > WARNING_INVALID_RATE {
        HealthClass::Warning
    } else {
        HealthClass::Healthy
    }
}

/// 多行文本形式的池状态报告
#[must_use]
pub fn generate_report(stats: &PoolStatistics) -> String {
    let mut report = String::from("=== Cookie池状态报告 ===\n");
    // 写入 String 不会失败
    let _ = writeln!(report, "总数量: {}", stats.total);
    let _ = writeln!(
        report,
        "可用: {} ({:.2}%)",
        stats.available,
        ratio_as_percentage(stats.available, stats.total)
    );
    let _ = writeln!(report, "使用中: {}", stats.using);
    let _ = writeln!(report, "已失效: {}", stats.invalid);
    let _ = writeln!(report, "黑名单: {}", stats.blacklist);
    let _ = writeln!(report, "总使用次数: {}", stats.total_use_count);
    let _ = writeln!(report, "平均使用次数: {:.2}", stats.avg_use_count);
    report.push_str("========================");
    report
}
