//! # 测试 Mock 对象
//!
//! 校验器与签名器的 mockall 实现，以及基于 wiremock 的校验接口桩

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use mockall::mock;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::ValidatorConfig;
use crate::validator::{Signer, Validator};

// 可设置期望的校验器，生成 `MockCredentialValidator`
mock! {
    pub CredentialValidator {}

    #[async_trait]
    impl Validator for CredentialValidator {
        async fn is_live(&self, secret: &str) -> bool;
    }
}

// 可设置期望的签名器，生成 `MockRequestSigner`
mock! {
    pub RequestSigner {}

    #[async_trait]
    impl Signer for RequestSigner {
        async fn sign(&self, api_path: &str, params: &Value) -> Option<String>;
    }
}

/// 固定结果的校验器，记录调用次数
///
/// 结果可在测试中途切换，适合并发场景
#[derive(Debug)]
pub struct StaticValidator {
    live: AtomicBool,
    calls: AtomicUsize,
}

impl StaticValidator {
    #[must_use]
    pub const fn new(live: bool) -> Self {
        Self {
            live: AtomicBool::new(live),
            calls: AtomicUsize::new(0),
        }
    }

    /// 切换后续校验的结果
    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::SeqCst);
    }

    /// 已发生的校验次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Validator for StaticValidator {
    async fn is_live(&self, _secret: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.live.load(Ordering::SeqCst)
    }
}

/// 模拟用户信息接口的 HTTP 服务器
pub struct MockValidationServer {
    server: MockServer,
    api_path: String,
}

impl MockValidationServer {
    /// 启动 Mock 服务器
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            api_path: ValidatorConfig::default().api_path,
        }
    }

    /// 指向本服务器的校验配置
    #[must_use]
    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            base_url: self.server.uri(),
            timeout_secs: 2,
            ..ValidatorConfig::default()
        }
    }

    async fn respond(&self, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(self.api_path.as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// 所有凭证判为有效
    pub async fn accept_all(&self) {
        self.respond(200, json!({"success": true, "data": {"nickname": "tester"}}))
            .await;
    }

    /// 业务层拒绝：200 且 `success` 为 false
    pub async fn reject_all(&self) {
        self.respond(200, json!({"success": false, "msg": "登录已过期"}))
            .await;
    }

    /// 以指定状态码拒绝
    pub async fn fail_with_status(&self, status: u16) {
        self.respond(status, json!({"success": false})).await;
    }

    /// 清除已挂载的响应与请求记录
    pub async fn reset(&self) {
        self.server.reset().await;
    }

    /// 已收到的请求数
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_validator_counts_calls() {
        let validator = StaticValidator::new(true);
        assert!(validator.is_live("a=1").await);
        validator.set_live(false);
        assert!(!validator.is_live("a=1").await);
        assert_eq!(validator.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_validator_expectations() {
        let mut validator = MockCredentialValidator::new();
        validator
            .expect_is_live()
            .withf(|secret| secret == "good")
            .times(1)
            .return_const(true);

        assert!(validator.is_live("good").await);
    }

    #[tokio::test]
    async fn test_mock_validation_server() {
        let server = MockValidationServer::start().await;
        server.accept_all().await;

        let config = server.validator_config();
        let url = format!("{}{}", config.base_url, config.api_path);
        let response = reqwest::get(&url).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(server.request_count().await, 1);
    }
}
