//! # 凭证生命周期模块
//!
//! 导入、出借、归还、校验、拉黑、编辑与删除。状态机：
//! 可用与出借中互相转换；校验失败转为失效；任意状态都可拉黑；
//! 失效且过期的凭证由回收任务删除

mod input;
mod service;
mod types;

pub use input::{parse_cookie, validate_ip_format, validate_secret_format};
pub use service::CredentialService;
pub use types::{
    BatchValidationItem, CheckoutLease, CredentialRef, ImportSummary, StatisticsSummary,
    ValidationOutcome,
};
