//! # Cookie Pool 主程序
//!
//! 加载配置、迁移数据库并运行后台回收与健康检查任务，收到 Ctrl-C 后退出

use std::sync::Arc;

use cookie_pool::{
    app::{AppResources, AppServices, AppTasks},
    config, database,
    error::prelude::*,
    lerror, linfo,
    logging::{self, LogComponent, LogStage},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Arc::new(config::load_config()?);
    logging::init_logging(Some(&config.log_level));

    let db = database::init_database(&config.database)
        .await
        .context("数据库连接失败")?;
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "run_migrations",
        "执行数据库迁移"
    );
    database::run_migrations(&db)
        .await
        .context("数据库迁移失败")?;

    let resources = AppResources::build(Arc::clone(&config), Arc::new(db));
    let services = AppServices::initialize(&resources)?;
    let tasks = AppTasks::initialize(&services).await?;
    tasks.start().await?;

    let stats = services.credential_service().statistics().await?;
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Main,
        "service_started",
        "凭证池已启动",
        total = stats.total,
        available = stats.available
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        lerror!(
            "system",
            LogStage::Shutdown,
            LogComponent::Main,
            "signal_failed",
            "监听退出信号失败",
            error = %e
        );
    }

    tasks.shutdown().await?;
    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Main,
        "service_shutdown",
        "服务正常关闭"
    );
    Ok(())
}
