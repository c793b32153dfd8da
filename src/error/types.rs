//! # 错误类型定义

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use super::ErrorCategory;

/// 凭证池主要错误类型
#[derive(Debug, Error)]
pub enum PoolError {
    /// 输入校验失败，不会触及存储
    #[error("参数校验失败: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// `ip` 唯一约束冲突
    #[error("IP已存在: {ip}")]
    DuplicateKey { ip: String },

    /// 引用的凭证、告警或周期不存在
    #[error("资源未找到: {resource} {identifier}")]
    NotFound {
        resource: String,
        identifier: String,
    },

    /// 持久化层错误
    #[error("存储错误: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 校验服务或签名器等外部依赖错误
    #[error("外部服务错误: {message}")]
    External {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 附加了上下文的错误
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PoolError>,
    },
}

impl PoolError {
    /// 错误所属类别，供传输层映射响应
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::DuplicateKey { .. } | Self::NotFound { .. } => {
                ErrorCategory::Client
            }
            Self::Context { source, .. } => source.category(),
            _ => ErrorCategory::Server,
        }
    }

    /// 稳定的错误代码
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DuplicateKey { .. } => "DUPLICATE_KEY",
            Self::NotFound { .. } => "RESOURCE_NOT_FOUND",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::External { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Context { source, .. } => source.error_code(),
        }
    }

    /// 剥离上下文后是否为未找到错误
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Context { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// 创建校验错误
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// 创建带字段名的校验错误
    pub fn validation_field<T: Into<String>, F: Into<String>>(message: T, field: F) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// 创建重复IP错误
    pub fn duplicate_key<T: Into<String>>(ip: T) -> Self {
        Self::DuplicateKey { ip: ip.into() }
    }

    /// 创建资源未找到错误
    pub fn not_found<R: Into<String>, I: ToString>(resource: R, identifier: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            identifier: identifier.to_string(),
        }
    }

    /// 出借时没有任何可用凭证
    #[must_use]
    pub fn no_available_credential() -> Self {
        Self::not_found("credential", "no available credential")
    }

    /// 创建存储错误
    pub fn storage<T: Into<String>>(message: T) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的存储错误
    pub fn storage_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建外部服务错误
    pub fn external<T: Into<String>>(message: T) -> Self {
        Self::External {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的外部服务错误
    pub fn external_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::External {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建内部错误
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的内部错误
    pub fn internal_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 写入凭证时的数据库错误转换：唯一约束冲突归为 `DuplicateKey`
    #[must_use]
    pub fn from_credential_write(err: DbErr, ip: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::duplicate_key(ip),
            _ => Self::from(err),
        }
    }
}

// 自动转换常见错误类型
impl From<std::io::Error> for PoolError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "文件操作失败".to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for PoolError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}

impl From<serde_json::Error> for PoolError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal_with_source("JSON处理失败", err)
    }
}

impl From<DbErr> for PoolError {
    fn from(err: DbErr) -> Self {
        Self::storage_with_source("数据库操作失败", err)
    }
}

impl From<reqwest::Error> for PoolError {
    fn from(err: reqwest::Error) -> Self {
        Self::external_with_source("HTTP请求失败", err)
    }
}
