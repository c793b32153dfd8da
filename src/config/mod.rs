//! # 配置管理模块
//!
//! 处理应用配置加载、验证和管理

mod app_config;
mod database;

pub use app_config::{AppConfig, MonitorConfig, ReclaimConfig, SignerConfig, ValidatorConfig};
pub use database::DatabaseConfig;

use crate::error::{PoolError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::linfo;
use std::env;
use std::path::Path;

/// 按 `RUST_ENV` 加载 `config/config.{env}.toml`
pub fn load_config() -> Result<AppConfig> {
    let env = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
    load_config_from(format!("config/config.{env}.toml"))
}

/// 从指定文件加载配置并校验
pub fn load_config_from(config_file: impl AsRef<Path>) -> Result<AppConfig> {
    let config_file = config_file.as_ref();

    if !config_file.exists() {
        return Err(PoolError::config(format!(
            "配置文件不存在: {}",
            config_file.display()
        )));
    }

    let config_content = std::fs::read_to_string(config_file).map_err(|e| {
        PoolError::config_with_source(format!("读取配置文件失败: {}", config_file.display()), e)
    })?;

    let config = parse_config(&config_content)?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Config,
        "load_config",
        "配置加载完成",
        file = %config_file.display()
    );

    Ok(config)
}

/// 解析 TOML 文本并校验
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.database.url, "sqlite://./data/cookie_pool.db");
        assert_eq!(config.validator.timeout_secs, 10);
        assert_eq!(config.signer.timeout_secs, 5);
        assert_eq!(config.reclaim.stuck_threshold_secs, 1800);
        assert_eq!(config.reclaim.expiry_sweep_interval_secs, 3600);
        assert_eq!(config.monitor.health_check_interval_secs, 3600);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = parse_config(
            r#"
            log_level = "debug"

            [reclaim]
            stuck_threshold_secs = 600

            [signer]
            script = "scripts/compute_xs.js"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.reclaim.stuck_threshold_secs, 600);
        assert_eq!(config.reclaim.stuck_sweep_interval_secs, 300);
        assert_eq!(config.signer.program, "node");
        assert_eq!(
            config.signer.script.as_deref(),
            Some("scripts/compute_xs.js")
        );
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = parse_config("[reclaim]\nstuck_sweep_interval_secs = 0\n").unwrap_err();
        assert!(matches!(err, PoolError::Config { .. }));
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = parse_config("[database\nurl = 1").unwrap_err();
        assert!(matches!(err, PoolError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nurl = \"sqlite::memory:\"").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert!(config.database.is_memory_database());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config_from("config/does-not-exist.toml").unwrap_err();
        assert!(err.to_string().contains("配置文件不存在"));
    }
}
