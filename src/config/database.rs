//! # 数据库配置

use crate::error::{PoolError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 数据库URL
    pub url: String,
    /// 最大连接数
    pub max_connections: u32,
    /// 连接超时时间（秒）
    pub connect_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/cookie_pool.db".to_string(),
            max_connections: 10,
            connect_timeout: 30,
        }
    }
}

impl DatabaseConfig {
    /// SQLite 文件库：创建缺失的父目录与空文件，内存库不做任何事
    pub fn ensure_database_path(&self) -> Result<()> {
        if self.is_sqlite() && !self.is_memory_database() {
            let path_str = self.url.strip_prefix("sqlite://").unwrap_or(&self.url);
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            let db_path = Path::new(path_str);

            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        PoolError::config_with_source(
                            format!("无法创建数据库目录: {}", parent.display()),
                            e,
                        )
                    })?;

                    linfo!(
                        "system",
                        LogStage::Startup,
                        LogComponent::Database,
                        "create_db_dir",
                        "已创建数据库目录",
                        dir = %parent.display()
                    );
                }
            }

            if !db_path.exists() {
                std::fs::File::create(db_path).map_err(|e| {
                    PoolError::config_with_source(
                        format!("无法创建数据库文件: {}", db_path.display()),
                        e,
                    )
                })?;
                linfo!(
                    "system",
                    LogStage::Startup,
                    LogComponent::Database,
                    "create_db_file",
                    "已创建空的数据库文件",
                    file = %db_path.display()
                );
            }
        }

        Ok(())
    }

    /// 连接字符串，文件库会先确保文件存在
    pub fn get_connection_url(&self) -> Result<String> {
        self.ensure_database_path()?;
        Ok(self.url.clone())
    }

    /// 检查是否为内存数据库
    #[must_use]
    pub fn is_memory_database(&self) -> bool {
        self.url.contains(":memory:")
    }

    /// 检查是否为SQLite数据库
    #[must_use]
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_parent_dir_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_file = dir.path().join("nested").join("pool.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", db_file.display()),
            ..DatabaseConfig::default()
        };

        let url = config.get_connection_url().unwrap();
        assert_eq!(url, config.url);
        assert!(db_file.exists());
    }

    #[test]
    fn test_memory_database_touches_nothing() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        assert!(config.is_memory_database());
        assert!(config.ensure_database_path().is_ok());
    }
}
