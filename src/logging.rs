//! # 日志配置模块
//!
//! 日志初始化以及统一的结构化日志宏。所有日志行都携带
//! `request_id`、`stage`、`component`、`operation` 四个字段，便于按阶段与组件过滤

use std::env;
use std::fmt;
use tracing_subscriber::{
    EnvFilter, fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// 日志所处的业务阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStage {
    Startup,
    Shutdown,
    BackgroundTask,
    Import,
    Checkout,
    Validation,
    Reclaim,
    HealthCheck,
    Maintenance,
}

impl LogStage {
    /// 字段值
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::BackgroundTask => "background_task",
            Self::Import => "import",
            Self::Checkout => "checkout",
            Self::Validation => "validation",
            Self::Reclaim => "reclaim",
            Self::HealthCheck => "health_check",
            Self::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for LogStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 产生日志的组件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogComponent {
    Main,
    Config,
    Database,
    Store,
    Validator,
    Signer,
    Lifecycle,
    Reclaimer,
    Monitor,
    Scheduler,
    Journal,
    Cycle,
}

impl LogComponent {
    /// 字段值
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Config => "config",
            Self::Database => "database",
            Self::Store => "store",
            Self::Validator => "validator",
            Self::Signer => "signer",
            Self::Lifecycle => "lifecycle",
            Self::Reclaimer => "reclaimer",
            Self::Monitor => "monitor",
            Self::Scheduler => "scheduler",
            Self::Journal => "journal",
            Self::Cycle => "cycle",
        }
    }
}

impl fmt::Display for LogComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 结构化 info 日志
#[macro_export]
macro_rules! linfo {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $description:expr $(, $($fields:tt)*)?) => {
        ::tracing::info!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($($fields)*,)?
            "{}",
            $description
        )
    };
}

/// 结构化 debug 日志
#[macro_export]
macro_rules! ldebug {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $description:expr $(, $($fields:tt)*)?) => {
        ::tracing::debug!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($($fields)*,)?
            "{}",
            $description
        )
    };
}

/// 结构化 warn 日志
#[macro_export]
macro_rules! lwarn {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $description:expr $(, $($fields:tt)*)?) => {
        ::tracing::warn!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($($fields)*,)?
            "{}",
            $description
        )
    };
}

/// 结构化 error 日志
#[macro_export]
macro_rules! lerror {
    ($request_id:expr, $stage:expr, $component:expr, $operation:expr, $description:expr $(, $($fields:tt)*)?) => {
        ::tracing::error!(
            request_id = %$request_id,
            stage = %$stage,
            component = %$component,
            operation = $operation,
            $($($fields)*,)?
            "{}",
            $description
        )
    };
}

/// 默认过滤规则：禁止数据库查询的详细日志
fn default_filter(level: &str) -> String {
    format!("{level},cookie_pool={level},sqlx::query=off,sea_orm::query=warn,sqlx=warn")
}

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先生效，否则使用配置中的级别
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level));

    let initialized = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)))
        .with(
            tracing_fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .is_ok();

    if initialized {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Main,
            "init_logging",
            "日志系统初始化完成",
            level = level
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_filter_silences_sql() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("debug,"));
        assert!(filter.contains("sqlx::query=off"));
        assert!(filter.contains("sea_orm::query=warn"));
    }

    #[test]
    fn test_stage_and_component_names() {
        assert_eq!(LogStage::HealthCheck.to_string(), "health_check");
        assert_eq!(LogComponent::Reclaimer.to_string(), "reclaimer");
        assert_eq!(LogComponent::Store.to_string(), "store");
    }

    #[test]
    #[serial]
    fn test_init_logging_twice_is_harmless() {
        init_logging(Some("warn"));
        init_logging(None);
    }
}
