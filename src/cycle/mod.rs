//! # 使用周期模块
//!
//! 周期是一次采集活动的时间窗口，记录窗口内每次凭证使用的结果

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use entity::{cycle_progress, usage_cycles};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::store::{PaginationInfo, PaginationParams, build_page};
use crate::types::{CredentialId, CycleId, CycleStatus};

/// 未指定时单个周期允许使用的凭证数
const DEFAULT_MAX_CREDENTIALS: i32 = 10;

/// 新建周期的参数
#[derive(Debug, Clone, Deserialize)]
pub struct NewCycle {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub target_count: Option<i32>,
    #[serde(default)]
    pub max_credentials: Option<i32>,
}

/// 周期报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle: usage_cycles::Model,
    /// 使用过的不同凭证数
    pub used_credentials: u64,
    pub successful_uses: u64,
    pub failed_uses: u64,
}

/// 使用周期服务
#[derive(Clone)]
pub struct CycleService {
    db: Arc<DatabaseConnection>,
}

impl CycleService {
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn create(&self, cycle: NewCycle) -> Result<usage_cycles::Model> {
        let name = cycle.name.trim();
        crate::ensure!(!name.is_empty(), "周期名称不能为空");
        crate::ensure!(cycle.start_time < cycle.end_time, "开始时间必须早于结束时间");

        let now = Utc::now().naive_utc();
        let created = usage_cycles::ActiveModel {
            name: Set(name.to_string()),
            description: Set(cycle.description),
            start_time: Set(cycle.start_time),
            end_time: Set(cycle.end_time),
            target_count: Set(cycle.target_count),
            current_count: Set(0),
            max_credentials: Set(cycle.max_credentials.unwrap_or(DEFAULT_MAX_CREDENTIALS)),
            status: Set(CycleStatus::Running.code()),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        linfo!(
            "system",
            LogStage::Maintenance,
            LogComponent::Cycle,
            "create_cycle",
            "创建使用周期",
            cycle_id = created.id,
            name = %created.name
        );
        Ok(created)
    }

    /// 当前时间落在窗口内且仍在进行中的周期
    pub async fn active(&self) -> Result<Option<usage_cycles::Model>> {
        let now = Utc::now().naive_utc();
        Ok(usage_cycles::Entity::find()
            .filter(usage_cycles::Column::Status.eq(CycleStatus::Running.code()))
            .filter(usage_cycles::Column::StartTime.lte(now))
            .filter(usage_cycles::Column::EndTime.gte(now))
            .order_by_asc(usage_cycles::Column::StartTime)
            .one(&*self.db)
            .await?)
    }

    pub async fn update_progress(&self, id: CycleId, current_count: i32) -> Result<()> {
        let result = usage_cycles::Entity::update_many()
            .col_expr(usage_cycles::Column::CurrentCount, Expr::value(current_count))
            .col_expr(usage_cycles::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(usage_cycles::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(PoolError::not_found("cycle", id));
        }
        Ok(())
    }

    /// 记录周期内的一次凭证使用
    pub async fn record_usage(
        &self,
        cycle_id: CycleId,
        credential_id: CredentialId,
        success: bool,
        error_message: Option<String>,
    ) -> Result<cycle_progress::Model> {
        self.require(cycle_id).await?;

        Ok(cycle_progress::ActiveModel {
            cycle_id: Set(cycle_id),
            credential_id: Set(credential_id),
            used_at: Set(Utc::now().naive_utc()),
            success: Set(success),
            error_message: Set(error_message),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?)
    }

    pub async fn complete(&self, id: CycleId) -> Result<()> {
        let now = Utc::now().naive_utc();
        let result = usage_cycles::Entity::update_many()
            .col_expr(usage_cycles::Column::Status, Expr::value(CycleStatus::Completed.code()))
            .col_expr(usage_cycles::Column::CompletedAt, Expr::value(now))
            .col_expr(usage_cycles::Column::UpdatedAt, Expr::value(now))
            .filter(usage_cycles::Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(PoolError::not_found("cycle", id));
        }

        linfo!(
            "system",
            LogStage::Maintenance,
            LogComponent::Cycle,
            "complete_cycle",
            "使用周期已完成",
            cycle_id = id
        );
        Ok(())
    }

    pub async fn report(&self, id: CycleId) -> Result<CycleReport> {
        let cycle = self.require(id).await?;

        let usages: Vec<(CredentialId, bool)> = cycle_progress::Entity::find()
            .select_only()
            .column(cycle_progress::Column::CredentialId)
            .column(cycle_progress::Column::Success)
            .filter(cycle_progress::Column::CycleId.eq(id))
            .into_tuple()
            .all(&*self.db)
            .await?;

        let mut used: Vec<CredentialId> =
            usages.iter().map(|(credential, _)| *credential).collect();
        used.sort_unstable();
        used.dedup();
        let successful_uses = usages.iter().filter(|(_, success)| *success).count();

        Ok(CycleReport {
            cycle,
            used_credentials: used.len() as u64,
            successful_uses: successful_uses as u64,
            failed_uses: (usages.len() - successful_uses) as u64,
        })
    }

    /// 周期列表，新建的在前
    pub async fn list(
        &self,
        params: PaginationParams,
    ) -> Result<(Vec<usage_cycles::Model>, PaginationInfo)> {
        let paginator = usage_cycles::Entity::find()
            .order_by_desc(usage_cycles::Column::CreatedAt)
            .order_by_desc(usage_cycles::Column::Id)
            .paginate(&*self.db, params.page_size);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page - 1).await?;
        Ok((rows, build_page(total, params)))
    }

    async fn require(&self, id: CycleId) -> Result<usage_cycles::Model> {
        usage_cycles::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| PoolError::not_found("cycle", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_db;
    use chrono::Duration;

    fn window(name: &str, start_offset_hours: i64, end_offset_hours: i64) -> NewCycle {
        let now = Utc::now().naive_utc();
        NewCycle {
            name: name.to_string(),
            description: None,
            start_time: now + Duration::hours(start_offset_hours),
            end_time: now + Duration::hours(end_offset_hours),
            target_count: Some(100),
            max_credentials: None,
        }
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let service = CycleService::new(create_test_db().await);

        let created = service.create(window(" 春季采集 ", -1, 1)).await.unwrap();
        assert_eq!(created.name, "春季采集");
        assert_eq!(created.max_credentials, DEFAULT_MAX_CREDENTIALS);
        assert_eq!(created.status, CycleStatus::Running.code());

        let err = service.create(window("  ", -1, 1)).await.unwrap_err();
        assert!(matches!(err, PoolError::Validation { .. }));
        let err = service.create(window("倒置", 1, -1)).await.unwrap_err();
        assert!(matches!(err, PoolError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_active_requires_running_and_current_window() {
        let service = CycleService::new(create_test_db().await);
        service.create(window("未来", 1, 2)).await.unwrap();
        assert!(service.active().await.unwrap().is_none());

        let current = service.create(window("当前", -1, 1)).await.unwrap();
        assert_eq!(service.active().await.unwrap().map(|c| c.id), Some(current.id));

        service.complete(current.id).await.unwrap();
        assert!(service.active().await.unwrap().is_none());
        assert!(service.complete(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_progress_and_report() {
        let service = CycleService::new(create_test_db().await);
        let cycle = service.create(window("报告", -1, 1)).await.unwrap();

        service.update_progress(cycle.id, 42).await.unwrap();
        service.record_usage(cycle.id, 1, true, None).await.unwrap();
        service.record_usage(cycle.id, 1, false, Some("超时".to_string())).await.unwrap();
        service.record_usage(cycle.id, 2, true, None).await.unwrap();

        let report = service.report(cycle.id).await.unwrap();
        assert_eq!(report.cycle.current_count, 42);
        assert_eq!(report.used_credentials, 2);
        assert_eq!(report.successful_uses, 2);
        assert_eq!(report.failed_uses, 1);

        assert!(service.update_progress(999, 1).await.unwrap_err().is_not_found());
        assert!(service.record_usage(999, 1, true, None).await.unwrap_err().is_not_found());
        assert!(service.report(999).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let service = CycleService::new(create_test_db().await);
        for name in ["一", "二", "三"] {
            service.create(window(name, -1, 1)).await.unwrap();
        }

        let (rows, page) = service.list(PaginationParams::new(Some(1), Some(2))).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        let names: Vec<_> = rows.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["三", "二"]);
    }
}
