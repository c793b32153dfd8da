//! # Cookie Pool
//!
//! 会话凭证池核心库：导入、独占借出、有效性校验、回收与健康告警

pub mod app;
pub mod config;
pub mod cycle;
pub mod database;
pub mod error;
pub mod journal;
pub mod lifecycle;
pub mod logging;
pub mod monitor;
pub mod reclaim;
pub mod store;
pub mod testing;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{PoolError, Result};
pub use lifecycle::CredentialService;
pub use store::CredentialStore;
