//! # 测试数据 Fixtures

use chrono::{Duration, NaiveDateTime, Utc};

use crate::store::NewCredential;

/// 按序号生成的测试 IP
#[must_use]
pub fn fixture_ip(index: usize) -> String {
    format!("10.0.0.{index}")
}

/// 凭证测试数据构建器
pub struct CredentialFixture {
    pub ip: String,
    pub secret: String,
    pub valid_until: Option<NaiveDateTime>,
}

impl Default for CredentialFixture {
    fn default() -> Self {
        Self {
            ip: fixture_ip(1),
            secret: "web_session=040069b3; a1=18c2f0; webId=9f1c".to_string(),
            valid_until: None,
        }
    }
}

impl CredentialFixture {
    /// 创建新的凭证 fixture
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ip(mut self, ip: &str) -> Self {
        self.ip = ip.to_string();
        self
    }

    #[must_use]
    pub fn secret(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    /// 有效期设为一小时前
    #[must_use]
    pub fn expired(mut self) -> Self {
        self.valid_until = Some(Utc::now().naive_utc() - Duration::hours(1));
        self
    }

    /// 有效期设为一天后
    #[must_use]
    pub fn expiring_later(mut self) -> Self {
        self.valid_until = Some(Utc::now().naive_utc() + Duration::days(1));
        self
    }

    #[must_use]
    pub fn build(self) -> NewCredential {
        let item = NewCredential::new(self.ip, self.secret);
        match self.valid_until {
            Some(valid_until) => item.with_valid_until(valid_until),
            None => item,
        }
    }
}

/// 一批 IP 连续的凭证，序号从 1 开始
#[must_use]
pub fn credential_batch(count: usize) -> Vec<NewCredential> {
    (1..=count)
        .map(|i| {
            CredentialFixture::new()
                .ip(&fixture_ip(i))
                .secret(&format!("web_session=session-{i}"))
                .build()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_builder() {
        let item = CredentialFixture::new().ip("1.2.3.4").expired().build();
        assert_eq!(item.ip, "1.2.3.4");
        assert!(item.valid_until.unwrap() < Utc::now().naive_utc());
    }

    #[test]
    fn test_credential_batch_ips_are_sequential() {
        let batch = credential_batch(3);
        let ips: Vec<_> = batch.iter().map(|c| c.ip.as_str()).collect();
        assert_eq!(ips, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    }
}
