//! # HTTP 校验器

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, COOKIE, USER_AGENT};
use serde_json::{Value, json};

use super::{Signer, Validator};
use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lwarn};

const SIGNATURE_HEADER: &str = "X-s";

/// 请求用户信息接口判断凭证是否有效
///
/// 仅当接口返回 200 且响应体 `success` 不为 `false` 时认为有效。
/// 超时、传输错误、非 200 响应与无法解析的响应体都判为无效
pub struct HttpValidator {
    client: reqwest::Client,
    endpoint: String,
    api_path: String,
    user_agent: String,
    signer: Arc<dyn Signer>,
}

impl HttpValidator {
    pub fn new(config: &ValidatorConfig, signer: Arc<dyn Signer>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), config.api_path),
            api_path: config.api_path.clone(),
            user_agent: config.user_agent.clone(),
            signer,
        })
    }

    async fn fetch_user_info(&self, secret: &str) -> Result<bool> {
        let signature = self.signer.sign(&self.api_path, &json!({})).await;

        let mut request = self
            .client
            .get(&self.endpoint)
            .header(USER_AGENT, &self.user_agent)
            .header(COOKIE, secret)
            .header(CONTENT_TYPE, "application/json;charset=UTF-8");

        match signature {
            Some(signature) => request = request.header(SIGNATURE_HEADER, signature),
            None => {
                ldebug!(
                    "system",
                    LogStage::Validation,
                    LogComponent::Validator,
                    "unsigned_request",
                    "签名不可用，发送无签名校验请求"
                );
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            ldebug!(
                "system",
                LogStage::Validation,
                LogComponent::Validator,
                "user_info_rejected",
                "校验接口返回非200状态",
                status = status.as_u16()
            );
            return Ok(false);
        }

        let body: Value = response.json().await?;
        Ok(body.get("success") != Some(&Value::Bool(false)))
    }
}

#[async_trait]
impl Validator for HttpValidator {
    async fn is_live(&self, secret: &str) -> bool {
        match self.fetch_user_info(secret).await {
            Ok(live) => live,
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::Validation,
                    LogComponent::Validator,
                    "user_info_failed",
                    "校验请求失败，按无效处理",
                    error = %e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRequestSigner;
    use crate::validator::NullSigner;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const API_PATH: &str = "/api/sns/web/v1/user/selfinfo";

    fn config_for(server: &MockServer, timeout_secs: u64) -> ValidatorConfig {
        ValidatorConfig {
            base_url: server.uri(),
            timeout_secs,
            ..ValidatorConfig::default()
        }
    }

    #[tokio::test]
    async fn test_signed_request_with_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .and(header("cookie", "web_session=abc"))
            .and(header("x-s", "XYS_signed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut signer = MockRequestSigner::new();
        signer
            .expect_sign()
            .withf(|api_path, params| api_path == API_PATH && params == &json!({}))
            .times(1)
            .returning(|_, _| Some("XYS_signed".to_string()));

        let validator = HttpValidator::new(&config_for(&server, 5), Arc::new(signer)).unwrap();
        assert!(validator.is_live("web_session=abc").await);
    }

    #[tokio::test]
    async fn test_unsigned_fallback_omits_signature_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(API_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&config_for(&server, 5), Arc::new(NullSigner)).unwrap();
        assert!(validator.is_live("a=1").await);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("x-s").is_none());
    }

    #[tokio::test]
    async fn test_success_false_is_not_live() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "msg": "登录已过期"})),
            )
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&config_for(&server, 5), Arc::new(NullSigner)).unwrap();
        assert!(!validator.is_live("a=1").await);
    }

    #[tokio::test]
    async fn test_non_200_is_not_live() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&config_for(&server, 5), Arc::new(NullSigner)).unwrap();
        assert!(!validator.is_live("a=1").await);
    }

    #[tokio::test]
    async fn test_unparseable_body_is_not_live() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&config_for(&server, 5), Arc::new(NullSigner)).unwrap();
        assert!(!validator.is_live("a=1").await);
    }

    #[tokio::test]
    async fn test_timeout_is_not_live() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let validator = HttpValidator::new(&config_for(&server, 1), Arc::new(NullSigner)).unwrap();
        assert!(!validator.is_live("a=1").await);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_not_live() {
        let config = ValidatorConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..ValidatorConfig::default()
        };
        let validator = HttpValidator::new(&config, Arc::new(NullSigner)).unwrap();
        assert!(!validator.is_live("a=1").await);
    }
}
