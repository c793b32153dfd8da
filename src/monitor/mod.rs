//! # 健康监控模块
//!
//! 根据池统计计算健康分级、评估告警条件并按类型去重写入告警

mod rules;
mod service;
mod types;

pub use rules::{classify_health, evaluate_alerts, generate_report};
pub use service::HealthMonitor;
pub use types::{AlertCondition, DailyAlertSummary, HealthCheckReport, HealthClass, PoolStatus};
