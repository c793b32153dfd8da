//! # 健康监控服务

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use entity::alerts::{self, Column};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tokio::sync::Mutex;

use super::rules::{classify_health, evaluate_alerts, generate_report};
use super::types::{DailyAlertSummary, HealthCheckReport, PoolStatus};
use crate::error::{PoolError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::store::CredentialStore;
use crate::types::{AlertId, AlertLevel, AlertStatus, ratio_as_percentage, round2};
use crate::{linfo, lwarn};

/// 健康监控
///
/// 告警表的唯一写入方。健康检查在内部串行执行，
/// 并发触发时不会写出两条同类型的未处理告警
#[derive(Clone)]
pub struct HealthMonitor {
    db: Arc<DatabaseConnection>,
    store: CredentialStore,
    check_lock: Arc<Mutex<()>>,
}

impl HealthMonitor {
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, store: CredentialStore) -> Self {
        Self {
            db,
            store,
            check_lock: Arc::new(Mutex::new(())),
        }
    }

    /// 写入一条未处理告警
    pub async fn record_alert(
        &self,
        level: AlertLevel,
        alert_type: &str,
        message: &str,
    ) -> Result<alerts::Model> {
        let alert = alerts::ActiveModel {
            level: Set(level.code()),
            alert_type: Set(alert_type.to_string()),
            message: Set(message.to_string()),
            status: Set(AlertStatus::Unresolved.code()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        lwarn!(
            "system",
            LogStage::HealthCheck,
            LogComponent::Monitor,
            "record_alert",
            "产生新的告警",
            alert_id = alert.id,
            level = %level,
            alert_type = alert_type,
            message = message
        );
        Ok(alert)
    }

    /// 未处理告警，级别高的在前，同级别新的在前
    pub async fn unresolved_alerts(&self, limit: u64) -> Result<Vec<alerts::Model>> {
        Ok(alerts::Entity::find()
            .filter(Column::Status.eq(AlertStatus::Unresolved.code()))
            .order_by_desc(Column::Level)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .limit(limit)
            .all(&*self.db)
            .await?)
    }

    /// 标记告警已处理
    pub async fn resolve_alert(&self, id: AlertId) -> Result<()> {
        let result = alerts::Entity::update_many()
            .col_expr(Column::Status, Expr::value(AlertStatus::Resolved.code()))
            .filter(Column::Id.eq(id))
            .exec(&*self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(PoolError::not_found("alert", id));
        }
        Ok(())
    }

    async fn has_unresolved(&self, alert_type: &str) -> Result<bool> {
        let count = alerts::Entity::find()
            .filter(Column::AlertType.eq(alert_type))
            .filter(Column::Status.eq(AlertStatus::Unresolved.code()))
            .count(&*self.db)
            .await?;
        Ok(count > 0)
    }

    /// 执行一次健康检查
    ///
    /// 对每个触发的条件，只有在没有同类型未处理告警时才写入新告警
    pub async fn run_health_check(&self) -> Result<HealthCheckReport> {
        let _guard = self.check_lock.lock().await;

        let stats = self.store.stats().await?;
        let conditions = evaluate_alerts(&stats);

        let mut created_alerts = 0;
        for condition in &conditions {
            if self.has_unresolved(condition.alert_type).await? {
                continue;
            }
            self.record_alert(condition.level, condition.alert_type, &condition.message)
                .await?;
            created_alerts += 1;
        }

        let report = generate_report(&stats);
        linfo!(
            "system",
            LogStage::HealthCheck,
            LogComponent::Monitor,
            "health_check",
            format!("健康检查完成\n{report}"),
            triggered = conditions.len(),
            created = created_alerts
        );

        Ok(HealthCheckReport {
            stats,
            alerts: conditions,
            created_alerts,
            report,
            timestamp: Utc::now().naive_utc(),
        })
    }

    /// 当前池状态与健康分级
    pub async fn pool_status(&self) -> Result<PoolStatus> {
        let stats = self.store.stats().await?;
        let alert_count = alerts::Entity::find()
            .filter(Column::Status.eq(AlertStatus::Unresolved.code()))
            .count(&*self.db)
            .await?;

        Ok(PoolStatus {
            alert_count,
            utilization_rate: round2(ratio_as_percentage(stats.using, stats.total)),
            availability_rate: round2(ratio_as_percentage(stats.available, stats.total)),
            health: classify_health(&stats),
            stats,
            timestamp: Utc::now().naive_utc(),
        })
    }

    /// 闭区间 `[start, end]` 内按天汇总的告警，新的日期在前
    pub async fn export_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyAlertSummary>> {
        crate::ensure!(start <= end, "开始日期不能晚于结束日期");

        let from = start.and_time(chrono::NaiveTime::MIN);
        let until = end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| PoolError::validation("结束日期超出范围"))?
            .and_time(chrono::NaiveTime::MIN);

        let rows = alerts::Entity::find()
            .filter(Column::CreatedAt.gte(from))
            .filter(Column::CreatedAt.lt(until))
            .all(&*self.db)
            .await?;

        let mut days: BTreeMap<NaiveDate, DailyAlertSummary> = BTreeMap::new();
        for alert in rows {
            let date = alert.created_at.date();
            let day = days
                .entry(date)
                .or_insert_with(|| DailyAlertSummary::empty(date));
            day.total_alerts += 1;
            match AlertLevel::from_code(alert.level) {
                Some(AlertLevel::Low) => day.low_level += 1,
                Some(AlertLevel::Medium) => day.medium_level += 1,
                Some(AlertLevel::High) => day.high_level += 1,
                None => {}
            }
            if alert.status == AlertStatus::Resolved.code() {
                day.resolved += 1;
            }
        }

        Ok(days.into_values().rev().collect())
    }
}
