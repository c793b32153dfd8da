//! # 凭证存储模块
//!
//! 凭证表的全部读写。出借、释放与校验结果写入都是带条件的单条 UPDATE，
//! 以受影响行数判断是否生效

mod credential_store;
mod pagination;
mod types;

pub use credential_store::{CredentialStore, INVALID_REASON};
pub use pagination::{PaginationInfo, PaginationParams, build_page};
pub use types::{BatchItemResult, CredentialFilter, CredentialPatch, NewCredential, PoolStatistics};
