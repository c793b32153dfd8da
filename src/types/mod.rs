//! # 领域类型
//!
//! 标识类型、状态枚举与比率换算工具

pub mod conversion;
pub mod domain;
pub use conversion::*;
pub use domain::*;
