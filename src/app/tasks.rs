use crate::app::periodic::PeriodicTask;
use crate::app::service_registry::AppServices;
use crate::app::task_scheduler::{ScheduledTask, TaskScheduler};
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 后台任务类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// 清理失效且过期的凭证
    ExpirySweep,
    /// 强制归还出借过久的凭证
    StuckSweep,
    /// 批量校验可用凭证
    ValidationSweep,
    /// 池健康检查
    HealthCheck,
}

impl TaskType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExpirySweep => "expiry_sweep",
            Self::StuckSweep => "stuck_sweep",
            Self::ValidationSweep => "validation_sweep",
            Self::HealthCheck => "health_check",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 后台任务集合：调度器及周期任务实例统一管理
///
/// 任务依赖服务，从 `AppServices` 获取；间隔取自配置
pub struct AppTasks {
    scheduler: Arc<TaskScheduler>,
    task_instances: HashMap<TaskType, Arc<PeriodicTask>>,
}

impl AppTasks {
    /// 初始化调度器并注册所有后台任务
    pub async fn initialize(services: &Arc<AppServices>) -> Result<Arc<Self>> {
        let config = services.config();
        let reclaim = &config.reclaim;

        let reclaimer = services.reclaimer();
        let expiry = {
            let reclaimer = Arc::clone(&reclaimer);
            PeriodicTask::new(TaskType::ExpirySweep, reclaim.expiry_sweep_interval(), move || {
                let reclaimer = Arc::clone(&reclaimer);
                async move { reclaimer.sweep_expired().await.map(|_| ()) }
            })
        };
        let stuck = {
            let reclaimer = Arc::clone(&reclaimer);
            PeriodicTask::new(TaskType::StuckSweep, reclaim.stuck_sweep_interval(), move || {
                let reclaimer = Arc::clone(&reclaimer);
                async move { reclaimer.release_stuck().await.map(|_| ()) }
            })
        };
        let validation = PeriodicTask::new(
            TaskType::ValidationSweep,
            reclaim.validation_sweep_interval(),
            move || {
                let reclaimer = Arc::clone(&reclaimer);
                async move { reclaimer.validate_available().await.map(|_| ()) }
            },
        );
        let health = {
            let monitor = services.health_monitor();
            PeriodicTask::new(
                TaskType::HealthCheck,
                config.monitor.health_check_interval(),
                move || {
                    let monitor = Arc::clone(&monitor);
                    async move { monitor.run_health_check().await.map(|_| ()) }
                },
            )
        };

        let mut task_instances = HashMap::new();
        let mut scheduled = Vec::new();
        for task in [expiry, stuck, validation, health] {
            let task = Arc::new(task);
            scheduled.push(schedule(&task)?);
            task_instances.insert(task.task_type(), task);
        }

        let scheduler = Arc::new(TaskScheduler::new());
        scheduler.register_many(scheduled).await;

        Ok(Arc::new(Self {
            scheduler,
            task_instances,
        }))
    }

    /// 启动全部任务
    pub async fn start(&self) -> Result<()> {
        self.scheduler.start_all().await
    }

    /// 停止全部任务，等待正在执行的一轮结束
    pub async fn shutdown(&self) -> Result<()> {
        self.scheduler.shutdown().await
    }

    #[must_use]
    pub fn scheduler(&self) -> Arc<TaskScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// 按类型获取任务实例
    #[must_use]
    pub fn get_task(&self, task_type: TaskType) -> Option<Arc<PeriodicTask>> {
        self.task_instances.get(&task_type).cloned()
    }
}

fn schedule(task: &Arc<PeriodicTask>) -> Result<ScheduledTask> {
    ScheduledTask::builder(task.task_type())
        .on_start({
            let task = Arc::clone(task);
            move || {
                let task = Arc::clone(&task);
                async move { task.start().await }
            }
        })
        .on_stop({
            let task = Arc::clone(task);
            move || {
                let task = Arc::clone(&task);
                async move { task.stop().await }
            }
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppResources;
    use crate::config::AppConfig;
    use crate::testing::{StaticValidator, create_test_db};
    use std::time::Duration;

    #[tokio::test]
    async fn test_registers_all_tasks_in_order() {
        let resources = AppResources::build(Arc::new(AppConfig::default()), create_test_db().await);
        let services =
            AppServices::with_validator(&resources, Arc::new(StaticValidator::new(true)));
        let tasks = AppTasks::initialize(&services).await.unwrap();

        assert_eq!(
            tasks.scheduler().registered().await,
            vec![
                TaskType::ExpirySweep,
                TaskType::StuckSweep,
                TaskType::ValidationSweep,
                TaskType::HealthCheck,
            ]
        );
        let health = tasks.get_task(TaskType::HealthCheck).unwrap();
        assert_eq!(health.period(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_health_check_task_writes_alerts() {
        let mut config = AppConfig::default();
        config.monitor.health_check_interval_secs = 1;
        let resources = AppResources::build(Arc::new(config), create_test_db().await);
        let services =
            AppServices::with_validator(&resources, Arc::new(StaticValidator::new(true)));
        let tasks = AppTasks::initialize(&services).await.unwrap();

        tasks.start().await.unwrap();
        for task_type in [TaskType::ExpirySweep, TaskType::HealthCheck] {
            assert!(tasks.get_task(task_type).unwrap().is_running().await);
        }
        tokio::time::sleep(Duration::from_millis(1300)).await;
        tasks.shutdown().await.unwrap();

        let alerts = services.health_monitor().unresolved_alerts(10).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, "EMPTY_POOL");
        assert!(!tasks.get_task(TaskType::HealthCheck).unwrap().is_running().await);
    }
}
