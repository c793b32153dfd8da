//! # 周期任务
//!
//! 按固定间隔重复执行一个异步动作，直到被取消。
//! 单次执行失败只记日志，不会终止循环；停止时等待正在执行的那一轮结束

use crate::app::task_scheduler::{TaskAction, TaskFuture};
use crate::app::tasks::TaskType;
use crate::error::{PoolError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, lwarn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// 周期任务
pub struct PeriodicTask {
    task_type: TaskType,
    period: Duration,
    action: TaskAction,
    running: Mutex<Option<Running>>,
}

impl PeriodicTask {
    pub fn new<F, Fut>(task_type: TaskType, period: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            task_type,
            period,
            action: Arc::new(move || -> TaskFuture { Box::pin(action()) }),
            running: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        self.task_type
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// 启动循环，第一次执行在一个间隔之后。重复启动会被忽略
    pub async fn start(&self) -> Result<()> {
        crate::ensure!(
            !self.period.is_zero(),
            Config,
            format!("任务 {} 的间隔不能为0", self.task_type)
        );

        let mut running = self.running.lock().await;
        if running.is_some() {
            lwarn!(
                "system",
                LogStage::BackgroundTask,
                LogComponent::Scheduler,
                "periodic_already_running",
                "周期任务已在运行",
                task = %self.task_type
            );
            return Ok(());
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_loop(
            self.task_type,
            self.period,
            Arc::clone(&self.action),
            cancel.clone(),
        ));
        *running = Some(Running { cancel, handle });
        Ok(())
    }

    /// 取消循环并等待其退出
    pub async fn stop(&self) -> Result<()> {
        let Some(Running { cancel, handle }) = self.running.lock().await.take() else {
            return Ok(());
        };
        cancel.cancel();
        handle.await.map_err(|e| {
            PoolError::internal(format!("周期任务 {} 异常退出: {e}", self.task_type))
        })
    }
}

async fn run_loop(
    task_type: TaskType,
    period: Duration,
    action: TaskAction,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(err) = action().await {
                    lerror!(
                        "system",
                        LogStage::BackgroundTask,
                        LogComponent::Scheduler,
                        "periodic_run_failed",
                        "周期任务执行失败",
                        task = %task_type,
                        error = %err
                    );
                }
            }
        }
    }

    ldebug!(
        "system",
        LogStage::Shutdown,
        LogComponent::Scheduler,
        "periodic_stopped",
        "周期任务已退出",
        task = %task_type
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>, fail: bool) -> PeriodicTask {
        let counter = Arc::clone(counter);
        PeriodicTask::new(TaskType::HealthCheck, Duration::from_millis(20), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                if fail {
                    Err(PoolError::internal("sweep failed"))
                } else {
                    Ok(())
                }
            }
        })
    }

    #[tokio::test]
    async fn test_runs_repeatedly_until_stopped() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task = counting_task(&counter, false);

        task.start().await.unwrap();
        assert!(task.is_running().await);
        tokio::time::sleep(Duration::from_millis(150)).await;
        task.stop().await.unwrap();
        assert!(!task.is_running().await);

        let runs = counter.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected at least two runs, got {runs}");
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), runs);
    }

    #[tokio::test]
    async fn test_failures_do_not_end_the_loop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task = counting_task(&counter, true);

        task.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        task.stop().await.unwrap();

        assert!(counter.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_first_run_waits_one_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_in = Arc::clone(&counter);
        let task = PeriodicTask::new(TaskType::ExpirySweep, Duration::from_secs(3600), move || {
            let counter = Arc::clone(&counter_in);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        task.start().await.unwrap();
        // 重复启动不会产生第二个循环
        task.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        task.stop().await.unwrap();
        task.stop().await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_period_is_rejected() {
        let task = PeriodicTask::new(TaskType::StuckSweep, Duration::ZERO, || async { Ok(()) });
        assert!(matches!(task.start().await, Err(PoolError::Config { .. })));
    }
}
