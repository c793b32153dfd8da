//! # 请求签名器

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::Signer;
use crate::config::SignerConfig;
use crate::error::{PoolError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, linfo, lwarn};

/// 未配置签名脚本时使用，始终返回 `None`
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSigner;

#[async_trait]
impl Signer for NullSigner {
    async fn sign(&self, _api_path: &str, _params: &serde_json::Value) -> Option<String> {
        None
    }
}

/// 通过外部进程计算签名
///
/// 向子进程 stdin 写入 `{"path": .., "params": ..}`，从 stdout 读取签名。
/// 超时、非零退出或前缀不符都视为签名不可用
#[derive(Debug, Clone)]
pub struct ScriptSigner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
    prefix: String,
}

impl ScriptSigner {
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        timeout: Duration,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
            prefix: prefix.into(),
        }
    }

    async fn run(&self, api_path: &str, params: &serde_json::Value) -> Result<String> {
        let payload = serde_json::to_vec(&json!({ "path": api_path, "params": params }))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PoolError::external_with_source(format!("无法启动签名进程: {}", self.program), e)
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&payload)
                .await
                .map_err(|e| PoolError::external_with_source("写入签名参数失败", e))?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                PoolError::external(format!("签名进程超时: {}s", self.timeout.as_secs()))
            })?
            .map_err(|e| PoolError::external_with_source("等待签名进程失败", e))?;

        if !output.status.success() {
            return Err(PoolError::external(format!(
                "签名进程异常退出: {}, stderr: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let signature = String::from_utf8_lossy(&output.stdout).trim().to_string();
        crate::ensure!(
            signature.starts_with(&self.prefix),
            External,
            format!("签名格式无效，缺少前缀 {}", self.prefix)
        );

        Ok(signature)
    }
}

#[async_trait]
impl Signer for ScriptSigner {
    async fn sign(&self, api_path: &str, params: &serde_json::Value) -> Option<String> {
        match self.run(api_path, params).await {
            Ok(signature) => {
                ldebug!(
                    "system",
                    LogStage::Validation,
                    LogComponent::Signer,
                    "sign",
                    "签名计算成功",
                    api_path = api_path
                );
                Some(signature)
            }
            Err(e) => {
                lwarn!(
                    "system",
                    LogStage::Validation,
                    LogComponent::Signer,
                    "sign_failed",
                    "签名计算失败，改用无签名请求",
                    api_path = api_path,
                    error = %e
                );
                None
            }
        }
    }
}

/// 按配置选择签名器：配置了脚本用外部进程，否则用空签名器
#[must_use]
pub fn signer_from_config(config: &SignerConfig) -> Arc<dyn Signer> {
    match config.script.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(script) => {
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::Signer,
                "signer_selected",
                "使用外部签名进程",
                program = %config.program,
                script = script
            );
            Arc::new(ScriptSigner::new(
                config.program.clone(),
                vec![script.to_string()],
                config.timeout(),
                config.signature_prefix.clone(),
            ))
        }
        None => {
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::Signer,
                "signer_selected",
                "未配置签名脚本，校验请求不带签名"
            );
            Arc::new(NullSigner)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_signer() {
        assert_eq!(NullSigner.sign("/api", &json!({})).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_signer_reads_stdout() {
        let signer = ScriptSigner::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo XYS_test".to_string()],
            Duration::from_secs(5),
            "XYS_",
        );
        assert_eq!(
            signer.sign("/api/sns/web/v1/user/selfinfo", &json!({})).await,
            Some("XYS_test".to_string())
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_signer_receives_path() {
        let signer = ScriptSigner::new(
            "sh",
            vec!["-c".to_string(), "printf 'XYS_'; cat".to_string()],
            Duration::from_secs(5),
            "XYS_",
        );
        let signature = signer.sign("/api/x", &json!({})).await.unwrap();
        assert!(signature.contains("\"path\":\"/api/x\""));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_signer_rejects_bad_prefix() {
        let signer = ScriptSigner::new(
            "sh",
            vec!["-c".to_string(), "cat >/dev/null; echo garbage".to_string()],
            Duration::from_secs(5),
            "XYS_",
        );
        assert_eq!(signer.sign("/api", &json!({})).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_signer_timeout() {
        let signer = ScriptSigner::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string()],
            Duration::from_millis(200),
            "XYS_",
        );
        assert_eq!(signer.sign("/api", &json!({})).await, None);
    }

    #[tokio::test]
    async fn test_missing_program_falls_back() {
        let signer = ScriptSigner::new(
            "definitely-not-a-real-signer-binary",
            vec![],
            Duration::from_secs(1),
            "XYS_",
        );
        assert_eq!(signer.sign("/api", &json!({})).await, None);
    }
}
