//! # 凭证回收模块
//!
//! 后台定时执行的三类巡检：删除过期失效凭证、强制归还卡死的出借、
//! 主动校验可用凭证。每次巡检都是一次性的，调度由 `app` 中的周期任务负责

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::journal::{JournalAction, JournalOutcome, OperationJournal};
use crate::lifecycle::CredentialService;
use crate::logging::{LogComponent, LogStage};
use crate::store::CredentialStore;
use crate::{lerror, linfo, lwarn};

/// 单次校验巡检的汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSweepSummary {
    pub checked: usize,
    pub valid: usize,
    pub invalid: usize,
}

/// 回收器
#[derive(Clone)]
pub struct Reclaimer {
    store: CredentialStore,
    journal: OperationJournal,
    credentials: CredentialService,
    stuck_threshold: Duration,
}

impl Reclaimer {
    #[must_use]
    pub fn new(
        store: CredentialStore,
        journal: OperationJournal,
        credentials: CredentialService,
        stuck_threshold: Duration,
    ) -> Self {
        Self {
            store,
            journal,
            credentials,
            stuck_threshold,
        }
    }

    /// 删除失效且已过有效期的凭证，返回删除数量
    pub async fn sweep_expired(&self) -> Result<u64> {
        let deleted = self.store.delete_expired().await?;
        linfo!(
            "system",
            LogStage::Reclaim,
            LogComponent::Reclaimer,
            "sweep_expired",
            "过期凭证清理完成",
            deleted = deleted
        );
        Ok(deleted)
    }

    /// 强制归还出借超过阈值的凭证，返回归还数量
    ///
    /// 查询与归还之间凭证可能已被正常归还或重新出借，
    /// 归还条件里带着截止时间，这类凭证不会被误放。
    /// 单行归还出错只记日志，其余凭证照常处理
    pub async fn release_stuck(&self) -> Result<usize> {
        let threshold = chrono::Duration::from_std(self.stuck_threshold)
            .map_err(|e| crate::error!(Config, "卡死阈值超出范围", e))?;
        let cutoff = Utc::now().naive_utc() - threshold;

        let mut released = 0;
        let mut failed = 0;
        for credential in self.store.find_stuck(cutoff).await? {
            match self.store.release_stale(credential.id, cutoff).await {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    failed += 1;
                    lerror!(
                        "system",
                        LogStage::Reclaim,
                        LogComponent::Reclaimer,
                        "release_stuck_failed",
                        "强制归还凭证失败",
                        credential_id = credential.id,
                        error = %e
                    );
                    continue;
                }
            }

            released += 1;
            lwarn!(
                "system",
                LogStage::Reclaim,
                LogComponent::Reclaimer,
                "release_stuck",
                "强制归还长时间未归还的凭证",
                credential_id = credential.id,
                ip = %credential.ip,
                last_used_at = ?credential.last_used_at
            );
            self.journal
                .record(
                    credential.id,
                    JournalAction::Reclaim,
                    JournalOutcome::Success,
                    Some("出借超时，强制归还"),
                )
                .await;
        }

        if released > 0 || failed > 0 {
            linfo!(
                "system",
                LogStage::Reclaim,
                LogComponent::Reclaimer,
                "release_stuck_done",
                "卡死凭证巡检完成",
                released = released,
                failed = failed
            );
        }
        Ok(released)
    }

    /// 校验当前全部可用凭证
    pub async fn validate_available(&self) -> Result<ValidationSweepSummary> {
        let results = self.credentials.batch_validate(None).await?;
        let valid = results.iter().filter(|r| r.valid).count();
        let summary = ValidationSweepSummary {
            checked: results.len(),
            valid,
            invalid: results.len() - valid,
        };

        linfo!(
            "system",
            LogStage::Validation,
            LogComponent::Reclaimer,
            "validate_available",
            "可用凭证巡检完成",
            checked = summary.checked,
            valid = summary.valid,
            invalid = summary.invalid
        );
        Ok(summary)
    }
}
