//! # 凭证存储

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use entity::credentials::{self, Column};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use super::pagination::{PaginationInfo, PaginationParams, build_page};
use super::types::{
    BatchItemResult, CredentialFilter, CredentialPatch, NewCredential, PoolStatistics,
};
use crate::error::{PoolError, Result};
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};
use crate::types::{CredentialId, CredentialStatus};

const AVAILABLE: i16 = CredentialStatus::Available.code();
const IN_USE: i16 = CredentialStatus::InUse.code();
const INVALID: i16 = CredentialStatus::Invalid.code();
const BLACKLISTED: i16 = CredentialStatus::Blacklisted.code();

/// 校验失败且未给出原因时写入的错误信息
pub const INVALID_REASON: &str = "Cookie已失效";

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// 凭证表的唯一写入方
#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<DatabaseConnection>,
}

impl CredentialStore {
    /// 创建存储实例
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 底层连接
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn insert_new<C: ConnectionTrait>(
        conn: &C,
        item: &NewCredential,
    ) -> std::result::Result<credentials::Model, DbErr> {
        let timestamp = now();
        credentials::ActiveModel {
            ip: Set(item.ip.clone()),
            secret: Set(item.secret.clone()),
            status: Set(AVAILABLE),
            in_use: Set(false),
            last_used_at: Set(None),
            last_checked_at: Set(None),
            use_count: Set(0),
            valid_until: Set(item.valid_until),
            error_message: Set(None),
            created_at: Set(timestamp),
            updated_at: Set(timestamp),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    /// 新增一条凭证，`ip` 冲突时返回 `DuplicateKey`
    pub async fn create(&self, item: &NewCredential) -> Result<credentials::Model> {
        Self::insert_new(&*self.db, item)
            .await
            .map_err(|e| PoolError::from_credential_write(e, &item.ip))
    }

    /// 批量新增
    ///
    /// 整批共用一个事务，每条记录包在独立的保存点里：单条失败只回滚该条，
    /// 其余成功的记录随事务一并提交
    pub async fn create_batch(&self, items: &[NewCredential]) -> Result<Vec<BatchItemResult>> {
        let txn = self.db.begin().await?;
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let savepoint = txn.begin().await?;
            match Self::insert_new(&savepoint, item).await {
                Ok(model) => {
                    savepoint.commit().await?;
                    results.push(BatchItemResult::ok(item.ip.clone(), model.id));
                }
                Err(err) => {
                    savepoint.rollback().await?;
                    let err = PoolError::from_credential_write(err, &item.ip);
                    ldebug!(
                        "system",
                        LogStage::Import,
                        LogComponent::Store,
                        "batch_item_rejected",
                        "批量导入中单条写入失败",
                        ip = %item.ip,
                        error = %err
                    );
                    results.push(BatchItemResult::failed(item.ip.clone(), err.to_string()));
                }
            }
        }

        txn.commit().await?;
        Ok(results)
    }

    /// 随机抽取可出借的凭证
    pub async fn find_unused(&self, limit: u64) -> Result<Vec<credentials::Model>> {
        let random = match self.db.get_database_backend() {
            DbBackend::MySql => "RAND()",
            _ => "RANDOM()",
        };

        Ok(credentials::Entity::find()
            .filter(Column::Status.eq(AVAILABLE))
            .filter(Column::InUse.eq(false))
            .order_by(Expr::cust(random), Order::Asc)
            .limit(limit)
            .all(&*self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: CredentialId) -> Result<Option<credentials::Model>> {
        Ok(credentials::Entity::find_by_id(id).one(&*self.db).await?)
    }

    pub async fn find_by_ip(&self, ip: &str) -> Result<Option<credentials::Model>> {
        Ok(credentials::Entity::find()
            .filter(Column::Ip.eq(ip))
            .one(&*self.db)
            .await?)
    }

    /// 分页列表，按创建时间倒序
    pub async fn find_all(
        &self,
        params: PaginationParams,
        filter: &CredentialFilter,
    ) -> Result<(Vec<credentials::Model>, PaginationInfo)> {
        let mut query = credentials::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.code()));
        }
        if let Some(ip) = filter.ip.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(Column::Ip.contains(ip));
        }

        let paginator = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&*self.db, params.page_size);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page - 1).await?;

        Ok((rows, build_page(total, params)))
    }

    /// 可用凭证 id，按 id 升序，最多 `limit` 条
    pub async fn available_ids(&self, limit: u64) -> Result<Vec<CredentialId>> {
        Ok(credentials::Entity::find()
            .select_only()
            .column(Column::Id)
            .filter(Column::Status.eq(AVAILABLE))
            .order_by_asc(Column::Id)
            .limit(limit)
            .into_tuple::<CredentialId>()
            .all(&*self.db)
            .await?)
    }

    /// 标记出借
    ///
    /// 仅当凭证仍为可用且未占用时生效，返回 `false` 表示被其他调用方抢先
    pub async fn mark_in_use(&self, id: CredentialId) -> Result<bool> {
        let timestamp = now();
        let result = credentials::Entity::update_many()
            .col_expr(Column::Status, Expr::value(IN_USE))
            .col_expr(Column::InUse, Expr::value(true))
            .col_expr(Column::LastUsedAt, Expr::value(timestamp))
            .col_expr(Column::UseCount, Expr::col(Column::UseCount).add(1))
            .col_expr(Column::UpdatedAt, Expr::value(timestamp))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(AVAILABLE))
            .filter(Column::InUse.eq(false))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// 归还出借中的凭证，其他状态不受影响
    pub async fn release(&self, id: CredentialId) -> Result<bool> {
        let result = credentials::Entity::update_many()
            .col_expr(Column::Status, Expr::value(AVAILABLE))
            .col_expr(Column::InUse, Expr::value(false))
            .col_expr(Column::UpdatedAt, Expr::value(now()))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(IN_USE))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// 强制归还 `cutoff` 之前出借且仍未归还的凭证
    ///
    /// 条件里带上出借时间，巡检期间被重新出借的凭证不会被误放
    pub async fn release_stale(&self, id: CredentialId, cutoff: NaiveDateTime) -> Result<bool> {
        let result = credentials::Entity::update_many()
            .col_expr(Column::Status, Expr::value(AVAILABLE))
            .col_expr(Column::InUse, Expr::value(false))
            .col_expr(Column::UpdatedAt, Expr::value(now()))
            .filter(Column::Id.eq(id))
            .filter(Column::InUse.eq(true))
            .filter(Column::LastUsedAt.lt(cutoff))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// 占用中且出借时间早于 `cutoff` 的凭证
    pub async fn find_stuck(&self, cutoff: NaiveDateTime) -> Result<Vec<credentials::Model>> {
        Ok(credentials::Entity::find()
            .filter(Column::InUse.eq(true))
            .filter(Column::LastUsedAt.lt(cutoff))
            .order_by_asc(Column::LastUsedAt)
            .all(&*self.db)
            .await?)
    }

    /// 写入校验结果，返回 `false` 表示凭证不存在
    ///
    /// 有效：可用与失效转为可用并清空错误，出借中保持出借；
    /// 无效：除黑名单外全部转为失效并释放占用。黑名单始终保留原状态与原因。
    /// 新状态由一条 UPDATE 按行内当前状态计算
    pub async fn record_check(
        &self,
        id: CredentialId,
        live: bool,
        reason: Option<&str>,
    ) -> Result<bool> {
        let timestamp = now();
        let status = || Expr::col(Column::Status);

        let update = credentials::Entity::update_many()
            .col_expr(Column::LastCheckedAt, Expr::value(timestamp))
            .col_expr(Column::UpdatedAt, Expr::value(timestamp))
            .filter(Column::Id.eq(id));

        let update = if live {
            update
                .col_expr(
                    Column::Status,
                    Expr::case(status().eq(IN_USE), IN_USE)
                        .case(status().eq(BLACKLISTED), BLACKLISTED)
                        .finally(AVAILABLE)
                        .into(),
                )
                .col_expr(
                    Column::InUse,
                    Expr::case(status().eq(IN_USE), true).finally(false).into(),
                )
                .col_expr(
                    Column::ErrorMessage,
                    Expr::case(status().eq(BLACKLISTED), Expr::col(Column::ErrorMessage))
                        .finally(Option::<String>::None)
                        .into(),
                )
        } else {
            let reason = reason.unwrap_or(INVALID_REASON).to_string();
            update
                .col_expr(
                    Column::Status,
                    Expr::case(status().eq(BLACKLISTED), BLACKLISTED)
                        .finally(INVALID)
                        .into(),
                )
                .col_expr(Column::InUse, Expr::value(false))
                .col_expr(
                    Column::ErrorMessage,
                    Expr::case(status().eq(BLACKLISTED), Expr::col(Column::ErrorMessage))
                        .finally(reason)
                        .into(),
                )
        };

        let result = update.exec(&*self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// 部分更新，修改状态时同步 `in_use`
    pub async fn update_fields(
        &self,
        id: CredentialId,
        patch: &CredentialPatch,
    ) -> Result<credentials::Model> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| PoolError::not_found("credential", id))?;

        let previous_status = CredentialStatus::from_code(existing.status);
        let target_ip = patch.ip.clone().unwrap_or_else(|| existing.ip.clone());
        let timestamp = now();
        let mut active: credentials::ActiveModel = existing.into();

        if let Some(ip) = &patch.ip {
            active.ip = Set(ip.clone());
        }
        if let Some(secret) = &patch.secret {
            active.secret = Set(secret.clone());
        }
        if let Some(valid_until) = patch.valid_until {
            active.valid_until = Set(valid_until);
        }
        if let Some(status) = patch.status {
            active.status = Set(status.code());
            active.in_use = Set(status.occupies());
            // 手工置为出借中时补上出借时间，便于卡死巡检回收
            if status.occupies() && previous_status != Some(status) {
                active.last_used_at = Set(Some(timestamp));
            }
        }
        active.updated_at = Set(timestamp);

        active.update(&*self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => PoolError::not_found("credential", id),
            other => PoolError::from_credential_write(other, &target_ip),
        })
    }

    /// 拉黑，返回 `false` 表示凭证不存在
    pub async fn blacklist(&self, id: CredentialId, reason: &str) -> Result<bool> {
        let result = credentials::Entity::update_many()
            .col_expr(Column::Status, Expr::value(BLACKLISTED))
            .col_expr(Column::InUse, Expr::value(false))
            .col_expr(Column::ErrorMessage, Expr::value(reason.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now()))
            .filter(Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn delete(&self, id: CredentialId) -> Result<bool> {
        let result = credentials::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// 删除已失效且过了有效期的凭证
    pub async fn delete_expired(&self) -> Result<u64> {
        let result = credentials::Entity::delete_many()
            .filter(Column::Status.eq(INVALID))
            .filter(Column::ValidUntil.is_not_null())
            .filter(Column::ValidUntil.lt(now()))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// 按状态聚合的池统计
    pub async fn stats(&self) -> Result<PoolStatistics> {
        let grouped = credentials::Entity::find()
            .select_only()
            .column(Column::Status)
            .column_as(Expr::col(Column::Id).count(), "count")
            .group_by(Column::Status)
            .into_tuple::<(i16, i64)>()
            .all(&*self.db)
            .await?;

        let mut stats = PoolStatistics::default();
        for (code, count) in grouped {
            let status = CredentialStatus::try_from(code).map_err(PoolError::storage)?;
            stats.tally(status, u64::try_from(count).unwrap_or_default());
        }

        let total_use_count = credentials::Entity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(use_count), 0)"), "total_use_count")
            .into_tuple::<i64>()
            .one(&*self.db)
            .await?
            .unwrap_or_default();

        stats.total_use_count = u64::try_from(total_use_count).unwrap_or_default();
        stats.avg_use_count =
            crate::types::ratio_as_f64(stats.total_use_count, stats.total).unwrap_or(0.0);

        Ok(stats)
    }
}
