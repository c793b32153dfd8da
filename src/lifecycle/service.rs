//! # 凭证生命周期服务

use std::collections::HashSet;
use std::sync::Arc;

use entity::credentials;

use super::types::{
    BatchValidationItem, CheckoutLease, CredentialRef, ImportSummary, StatisticsSummary,
    ValidationOutcome,
};
use crate::error::{PoolError, Result};
use crate::journal::{JournalAction, JournalOutcome, OperationJournal};
use crate::logging::{LogComponent, LogStage};
use crate::store::{
    CredentialFilter, CredentialPatch, CredentialStore, INVALID_REASON, NewCredential,
    PaginationInfo, PaginationParams,
};
use crate::types::CredentialId;
use crate::validator::Validator;
use crate::{ldebug, lerror, linfo, lwarn};

/// 每轮随机抽取的候选数
const CHECKOUT_SAMPLE: u64 = 5;

/// 凭证状态机的唯一入口
///
/// 所有状态变更都经由存储层的条件 UPDATE 完成，服务本身不持有可变状态，
/// 可以在多个任务间共享
#[derive(Clone)]
pub struct CredentialService {
    store: CredentialStore,
    journal: OperationJournal,
    validator: Arc<dyn Validator>,
    batch_cap: u64,
}

impl CredentialService {
    /// `batch_cap` 为不指定 id 的批量校验上限
    #[must_use]
    pub fn new(
        store: CredentialStore,
        journal: OperationJournal,
        validator: Arc<dyn Validator>,
        batch_cap: u64,
    ) -> Self {
        Self {
            store,
            journal,
            validator,
            batch_cap,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// 批量导入
    ///
    /// 任何一条缺少 ip 或 secret 都会在写库前整体拒绝；
    /// 重复 ip 只让该条失败，其余记录照常提交
    pub async fn import(&self, records: Vec<NewCredential>) -> Result<ImportSummary> {
        crate::ensure!(!records.is_empty(), "导入列表不能为空");

        let mut items = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let ip = record.ip.trim();
            let secret = record.secret.trim();
            if ip.is_empty() || secret.is_empty() {
                return Err(PoolError::validation_field(
                    format!("第{}条记录缺少 ip 或 cookie", index + 1),
                    "records",
                ));
            }
            items.push(NewCredential {
                ip: ip.to_string(),
                secret: secret.to_string(),
                valid_until: record.valid_until,
            });
        }

        let details = self.store.create_batch(&items).await?;
        for item in details.iter().filter(|d| d.success) {
            if let Some(id) = item.id {
                self.journal
                    .record(id, JournalAction::Import, JournalOutcome::Success, None)
                    .await;
            }
        }

        let summary = ImportSummary::from_details(details);
        linfo!(
            "system",
            LogStage::Import,
            LogComponent::Lifecycle,
            "import",
            "凭证批量导入完成",
            total = summary.total,
            success = summary.success,
            failed = summary.failed
        );
        Ok(summary)
    }

    /// 随机出借一个可用凭证
    ///
    /// 抽样后逐个尝试条件 UPDATE，被抢先的候选直接跳过，
    /// 整轮落空就重新抽样。池中再无候选时返回 `NotFound`
    pub async fn checkout(&self) -> Result<CheckoutLease> {
        loop {
            let candidates = self.store.find_unused(CHECKOUT_SAMPLE).await?;
            if candidates.is_empty() {
                break;
            }

            for candidate in candidates {
                if !self.store.mark_in_use(candidate.id).await? {
                    ldebug!(
                        "system",
                        LogStage::Checkout,
                        LogComponent::Lifecycle,
                        "checkout_contended",
                        "候选凭证已被其他调用方占用",
                        credential_id = candidate.id
                    );
                    continue;
                }

                let leased = self
                    .store
                    .find_by_id(candidate.id)
                    .await?
                    .ok_or_else(|| PoolError::not_found("credential", candidate.id))?;
                self.journal
                    .record(leased.id, JournalAction::Checkout, JournalOutcome::Success, None)
                    .await;
                linfo!(
                    "system",
                    LogStage::Checkout,
                    LogComponent::Lifecycle,
                    "checkout",
                    "凭证已出借",
                    credential_id = leased.id,
                    ip = %leased.ip,
                    use_count = leased.use_count
                );

                return Ok(CheckoutLease {
                    id: leased.id,
                    ip: leased.ip,
                    secret: leased.secret,
                    use_count: leased.use_count,
                });
            }
        }

        lwarn!(
            "system",
            LogStage::Checkout,
            LogComponent::Lifecycle,
            "checkout_exhausted",
            "没有可用的凭证"
        );
        Err(PoolError::no_available_credential())
    }

    /// 校验单个凭证并写回结果
    pub async fn validate(&self, id: CredentialId) -> Result<ValidationOutcome> {
        let credential = self.require(id).await?;
        self.check(&credential).await
    }

    async fn check(&self, credential: &credentials::Model) -> Result<ValidationOutcome> {
        let live = self.validator.is_live(&credential.secret).await;
        let reason = (!live).then(|| INVALID_REASON.to_string());

        match self
            .store
            .record_check(credential.id, live, reason.as_deref())
            .await
        {
            Ok(true) => {}
            // 校验期间凭证被删除
            Ok(false) => return Err(PoolError::not_found("credential", credential.id)),
            Err(e) => {
                self.mark_failed(credential.id, &e).await;
                return Err(e);
            }
        }

        let outcome = if live {
            JournalOutcome::Success
        } else {
            JournalOutcome::Failure
        };
        self.journal
            .record(credential.id, JournalAction::Check, outcome, reason.as_deref())
            .await;

        ldebug!(
            "system",
            LogStage::Validation,
            LogComponent::Lifecycle,
            "validate",
            "凭证校验完成",
            credential_id = credential.id,
            valid = live
        );

        Ok(ValidationOutcome {
            valid: live,
            ip: credential.ip.clone(),
            reason,
        })
    }

    /// 校验过程出错时尽量把凭证标记为失效，错误本身仍交给调用方
    async fn mark_failed(&self, id: CredentialId, error: &PoolError) {
        let message = error.to_string();
        if let Err(e) = self.store.record_check(id, false, Some(&message)).await {
            lerror!(
                "system",
                LogStage::Validation,
                LogComponent::Lifecycle,
                "mark_invalid_failed",
                "校验出错后标记失效也失败",
                credential_id = id,
                error = %e
            );
        }
        self.journal
            .record(id, JournalAction::Check, JournalOutcome::Failure, Some(&message))
            .await;
    }

    /// 批量校验
    ///
    /// 不传 id 时校验当前全部可用凭证（受上限约束）。按顺序逐个处理，
    /// 单条出错记为无效并继续；不存在的 id 跳过，重复 id 只校验一次
    pub async fn batch_validate(
        &self,
        ids: Option<Vec<CredentialId>>,
    ) -> Result<Vec<BatchValidationItem>> {
        let ids = match ids {
            Some(ids) => {
                let mut seen = HashSet::with_capacity(ids.len());
                ids.into_iter().filter(|id| seen.insert(*id)).collect()
            }
            None => self.store.available_ids(self.batch_cap).await?,
        };

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let credential = match self.store.find_by_id(id).await {
                Ok(Some(credential)) => credential,
                Ok(None) => continue,
                Err(e) => {
                    self.mark_failed(id, &e).await;
                    results.push(BatchValidationItem {
                        id,
                        ip: None,
                        valid: false,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            let item = match self.check(&credential).await {
                Ok(outcome) => BatchValidationItem {
                    id,
                    ip: Some(outcome.ip),
                    valid: outcome.valid,
                    error: outcome.reason,
                },
                Err(e) => BatchValidationItem {
                    id,
                    ip: Some(credential.ip),
                    valid: false,
                    error: Some(e.to_string()),
                },
            };
            results.push(item);
        }

        linfo!(
            "system",
            LogStage::Validation,
            LogComponent::Lifecycle,
            "batch_validate",
            "批量校验完成",
            checked = results.len(),
            valid = results.iter().filter(|r| r.valid).count()
        );
        Ok(results)
    }

    /// 归还凭证；对未出借的凭证是成功的空操作
    pub async fn release(&self, id: CredentialId) -> Result<CredentialRef> {
        let credential = self.require(id).await?;
        if self.store.release(id).await? {
            self.journal
                .record(id, JournalAction::Release, JournalOutcome::Success, None)
                .await;
            ldebug!(
                "system",
                LogStage::Checkout,
                LogComponent::Lifecycle,
                "release",
                "凭证已归还",
                credential_id = id
            );
        }

        Ok(CredentialRef {
            id,
            ip: credential.ip,
        })
    }

    /// 拉黑凭证
    pub async fn blacklist(&self, id: CredentialId, reason: &str) -> Result<CredentialRef> {
        let credential = self.require(id).await?;
        if !self.store.blacklist(id, reason).await? {
            return Err(PoolError::not_found("credential", id));
        }

        self.journal
            .record(id, JournalAction::Blacklist, JournalOutcome::Success, Some(reason))
            .await;
        linfo!(
            "system",
            LogStage::Maintenance,
            LogComponent::Lifecycle,
            "blacklist",
            "凭证已加入黑名单",
            credential_id = id,
            ip = %credential.ip,
            reason = reason
        );

        Ok(CredentialRef {
            id,
            ip: credential.ip,
        })
    }

    /// 编辑凭证
    ///
    /// 直接写入目标状态，可用于把黑名单凭证人工恢复
    pub async fn update(
        &self,
        id: CredentialId,
        mut patch: CredentialPatch,
    ) -> Result<credentials::Model> {
        crate::ensure!(!patch.is_empty(), "没有需要更新的字段");
        if let Some(ip) = patch.ip.as_mut() {
            *ip = ip.trim().to_string();
            crate::ensure!(!ip.is_empty(), "ip 不能为空");
        }
        if let Some(secret) = patch.secret.as_mut() {
            *secret = secret.trim().to_string();
            crate::ensure!(!secret.is_empty(), "cookie 不能为空");
        }

        let updated = self.store.update_fields(id, &patch).await?;
        self.journal
            .record(id, JournalAction::Update, JournalOutcome::Success, None)
            .await;
        Ok(updated)
    }

    /// 删除凭证，返回 `false` 表示不存在
    pub async fn delete(&self, id: CredentialId) -> Result<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            self.journal
                .record(id, JournalAction::Delete, JournalOutcome::Success, None)
                .await;
        }
        Ok(deleted)
    }

    pub async fn statistics(&self) -> Result<StatisticsSummary> {
        Ok(self.store.stats().await?.into())
    }

    pub async fn detail(&self, id: CredentialId) -> Result<credentials::Model> {
        self.require(id).await
    }

    pub async fn list(
        &self,
        params: PaginationParams,
        filter: &CredentialFilter,
    ) -> Result<(Vec<credentials::Model>, PaginationInfo)> {
        self.store.find_all(params, filter).await
    }

    async fn require(&self, id: CredentialId) -> Result<credentials::Model> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| PoolError::not_found("credential", id))
    }
}
