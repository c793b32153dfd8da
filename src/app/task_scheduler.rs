//! # 后台任务调度器
//!
//! 统一注册、启动与停止后台任务，启动按注册顺序，停止按逆序

use crate::app::tasks::TaskType;
use crate::error::{PoolError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{lerror, linfo, lwarn};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
pub(crate) type TaskAction = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// 调度任务定义
#[derive(Clone)]
pub struct ScheduledTask {
    task_type: TaskType,
    start: TaskAction,
    stop: Option<TaskAction>,
}

impl ScheduledTask {
    /// 创建任务构建器
    #[must_use]
    pub fn builder(task_type: TaskType) -> ScheduledTaskBuilder {
        ScheduledTaskBuilder {
            task_type,
            start: None,
            stop: None,
        }
    }

    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    async fn start(&self) -> Result<()> {
        linfo!(
            "system",
            LogStage::BackgroundTask,
            LogComponent::Scheduler,
            "task_start",
            "启动后台任务",
            task = %self.task_type
        );
        (self.start)().await
    }

    async fn stop(&self) -> Result<()> {
        if let Some(action) = &self.stop {
            linfo!(
                "system",
                LogStage::Shutdown,
                LogComponent::Scheduler,
                "task_stop",
                "停止后台任务",
                task = %self.task_type
            );
            action().await
        } else {
            lwarn!(
                "system",
                LogStage::Shutdown,
                LogComponent::Scheduler,
                "task_stop_skipped",
                "后台任务没有注册停止逻辑",
                task = %self.task_type
            );
            Ok(())
        }
    }
}

/// 任务构建器
pub struct ScheduledTaskBuilder {
    task_type: TaskType,
    start: Option<TaskAction>,
    stop: Option<TaskAction>,
}

impl ScheduledTaskBuilder {
    /// 注册启动逻辑
    #[must_use]
    pub fn on_start<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.start = Some(Arc::new(move || -> TaskFuture { Box::pin(action()) }));
        self
    }

    /// 注册停止逻辑
    #[must_use]
    pub fn on_stop<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.stop = Some(Arc::new(move || -> TaskFuture { Box::pin(action()) }));
        self
    }

    /// 构建最终任务，缺少启动逻辑时返回错误
    pub fn build(self) -> Result<ScheduledTask> {
        let start = self.start.ok_or_else(|| {
            PoolError::internal(format!("后台任务 {} 缺少启动逻辑", self.task_type))
        })?;
        Ok(ScheduledTask {
            task_type: self.task_type,
            start,
            stop: self.stop,
        })
    }
}

/// 后台任务调度器
#[derive(Default)]
pub struct TaskScheduler {
    tasks: RwLock<Vec<ScheduledTask>>,
}

impl TaskScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 批量注册任务
    pub async fn register_many(&self, tasks: Vec<ScheduledTask>) {
        self.tasks.write().await.extend(tasks);
    }

    /// 已注册的任务类型，按注册顺序
    pub async fn registered(&self) -> Vec<TaskType> {
        self.tasks
            .read()
            .await
            .iter()
            .map(ScheduledTask::task_type)
            .collect()
    }

    /// 启动所有任务
    pub async fn start_all(&self) -> Result<()> {
        let tasks = { self.tasks.read().await.clone() };
        for task in tasks {
            if let Err(err) = task.start().await {
                lerror!(
                    "system",
                    LogStage::BackgroundTask,
                    LogComponent::Scheduler,
                    "task_start_failed",
                    "后台任务启动失败",
                    task = %task.task_type,
                    error = %err
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// 停止所有任务（逆序执行）
    ///
    /// 单个任务停止失败只记录日志，其余任务照常停止，最后返回第一个错误
    pub async fn shutdown(&self) -> Result<()> {
        let tasks = { self.tasks.read().await.clone() };
        let mut first_error = None;
        for task in tasks.into_iter().rev() {
            if let Err(err) = task.stop().await {
                lerror!(
                    "system",
                    LogStage::Shutdown,
                    LogComponent::Scheduler,
                    "task_stop_failed",
                    "后台任务未能正常停止",
                    task = %task.task_type,
                    error = %err
                );
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_task(task_type: TaskType, log: &Arc<Mutex<Vec<String>>>) -> ScheduledTask {
        let on_start = Arc::clone(log);
        let on_stop = Arc::clone(log);
        ScheduledTask::builder(task_type)
            .on_start(move || {
                let log = Arc::clone(&on_start);
                async move {
                    log.lock().unwrap().push(format!("start:{task_type}"));
                    Ok(())
                }
            })
            .on_stop(move || {
                let log = Arc::clone(&on_stop);
                async move {
                    log.lock().unwrap().push(format!("stop:{task_type}"));
                    Ok(())
                }
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_start_in_order_and_stop_in_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let scheduler = TaskScheduler::new();
        scheduler
            .register_many(vec![
                recording_task(TaskType::ExpirySweep, &log),
                recording_task(TaskType::HealthCheck, &log),
            ])
            .await;

        scheduler.start_all().await.unwrap();
        scheduler.shutdown().await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "start:expiry_sweep",
                "start:health_check",
                "stop:health_check",
                "stop:expiry_sweep",
            ]
        );
    }

    #[test]
    fn test_build_requires_start_action() {
        let result = ScheduledTask::builder(TaskType::StuckSweep).build();
        assert!(matches!(result, Err(PoolError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_failed_start_is_reported() {
        let scheduler = TaskScheduler::new();
        scheduler
            .register_many(vec![
                ScheduledTask::builder(TaskType::ValidationSweep)
                    .on_start(|| async { Err(PoolError::internal("boom")) })
                    .build()
                    .unwrap(),
            ])
            .await;

        assert!(scheduler.start_all().await.is_err());
        // 没有停止逻辑的任务停止时只告警
        assert!(scheduler.shutdown().await.is_ok());
    }
}
