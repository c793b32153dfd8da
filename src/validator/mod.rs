//! # 凭证校验模块
//!
//! `Validator` 判断一个凭证是否仍然有效，`Signer` 为校验请求计算签名。
//! 两者都是启动时注入的能力，测试中可替换为内存实现

mod http;
mod signer;

pub use http::HttpValidator;
pub use signer::{NullSigner, ScriptSigner, signer_from_config};

use async_trait::async_trait;

/// 凭证有效性校验
///
/// 只做对外 I/O，不写存储。无法确认有效时一律返回 `false`
#[async_trait]
pub trait Validator: Send + Sync {
    async fn is_live(&self, secret: &str) -> bool;
}

/// 请求签名
///
/// 返回 `None` 表示签名不可用，调用方改走无签名请求
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, api_path: &str, params: &serde_json::Value) -> Option<String>;
}
