//! # 应用配置结构定义

use crate::error::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 应用主配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 数据库配置
    pub database: super::DatabaseConfig,
    /// 凭证有效性校验配置
    pub validator: ValidatorConfig,
    /// 请求签名配置
    pub signer: SignerConfig,
    /// 回收与巡检任务配置
    pub reclaim: ReclaimConfig,
    /// 健康监控配置
    pub monitor: MonitorConfig,
    /// 日志级别
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: super::DatabaseConfig::default(),
            validator: ValidatorConfig::default(),
            signer: SignerConfig::default(),
            reclaim: ReclaimConfig::default(),
            monitor: MonitorConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// 凭证有效性校验配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// 校验服务地址
    pub base_url: String,
    /// 用户信息接口路径，同时作为签名输入
    pub api_path: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 请求 User-Agent
    pub user_agent: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://edith.xiaohongshu.com".to_string(),
            api_path: "/api/sns/web/v1/user/selfinfo".to_string(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl ValidatorConfig {
    /// 请求超时
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 外部签名进程配置
///
/// 未配置 `script` 时启动阶段选用空签名器，所有校验走无签名请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// 解释器或可执行程序
    pub program: String,
    /// 签名脚本路径
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// 签名进程超时（秒）
    pub timeout_secs: u64,
    /// 合法签名的前缀
    pub signature_prefix: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            script: None,
            timeout_secs: 5,
            signature_prefix: "XYS_".to_string(),
        }
    }
}

impl SignerConfig {
    /// 签名进程超时
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 回收与巡检任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReclaimConfig {
    /// 过期清理间隔（秒）
    pub expiry_sweep_interval_secs: u64,
    /// 卡死凭证巡检间隔（秒）
    pub stuck_sweep_interval_secs: u64,
    /// 出借超过该时长视为卡死（秒）
    pub stuck_threshold_secs: u64,
    /// 可用凭证批量校验间隔（秒）
    pub validation_sweep_interval_secs: u64,
    /// 单次批量校验上限
    pub validation_batch_cap: u64,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            expiry_sweep_interval_secs: 3600,
            stuck_sweep_interval_secs: 300,
            stuck_threshold_secs: 1800,
            validation_sweep_interval_secs: 300,
            validation_batch_cap: 1000,
        }
    }
}

impl ReclaimConfig {
    /// 过期清理间隔
    #[must_use]
    pub const fn expiry_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_sweep_interval_secs)
    }

    /// 卡死巡检间隔
    #[must_use]
    pub const fn stuck_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.stuck_sweep_interval_secs)
    }

    /// 卡死阈值
    #[must_use]
    pub const fn stuck_threshold(&self) -> Duration {
        Duration::from_secs(self.stuck_threshold_secs)
    }

    /// 批量校验间隔
    #[must_use]
    pub const fn validation_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.validation_sweep_interval_secs)
    }
}

/// 健康监控配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 健康检查间隔（秒）
    pub health_check_interval_secs: u64,
    /// 未处理告警查询上限
    pub unresolved_alert_limit: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            health_check_interval_secs: 3600,
            unresolved_alert_limit: 100,
        }
    }
}

impl MonitorConfig {
    /// 健康检查间隔
    #[must_use]
    pub const fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs)
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            return Err(PoolError::config("数据库URL不能为空"));
        }
        if self.database.max_connections == 0 {
            return Err(PoolError::config("数据库最大连接数必须大于0"));
        }

        if self.validator.base_url.is_empty() || !self.validator.api_path.starts_with('/') {
            return Err(PoolError::config("校验服务地址或接口路径无效"));
        }
        if self.validator.timeout_secs == 0 {
            return Err(PoolError::config("校验请求超时必须大于0"));
        }

        if self.signer.timeout_secs == 0 {
            return Err(PoolError::config("签名进程超时必须大于0"));
        }
        if self.signer.script.is_some() && self.signer.program.trim().is_empty() {
            return Err(PoolError::config("配置了签名脚本时必须指定 signer.program"));
        }

        let intervals = [
            ("reclaim.expiry_sweep_interval_secs", self.reclaim.expiry_sweep_interval_secs),
            ("reclaim.stuck_sweep_interval_secs", self.reclaim.stuck_sweep_interval_secs),
            ("reclaim.stuck_threshold_secs", self.reclaim.stuck_threshold_secs),
            (
                "reclaim.validation_sweep_interval_secs",
                self.reclaim.validation_sweep_interval_secs,
            ),
            (
                "monitor.health_check_interval_secs",
                self.monitor.health_check_interval_secs,
            ),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, secs)| *secs == 0) {
            return Err(PoolError::config(format!("{name} 必须大于0")));
        }

        if self.reclaim.validation_batch_cap == 0 {
            return Err(PoolError::config("批量校验上限必须大于0"));
        }
        if self.monitor.unresolved_alert_limit == 0 {
            return Err(PoolError::config("未处理告警查询上限必须大于0"));
        }

        Ok(())
    }
}
