use crate::app::resources::AppResources;
use crate::config::AppConfig;
use crate::cycle::CycleService;
use crate::error::Result;
use crate::journal::OperationJournal;
use crate::lifecycle::CredentialService;
use crate::monitor::HealthMonitor;
use crate::reclaim::Reclaimer;
use crate::store::CredentialStore;
use crate::validator::{HttpValidator, Validator, signer_from_config};
use std::sync::Arc;

/// 业务服务集合：生命周期、回收、监控与周期服务
///
/// 不包含任务调度逻辑（由 `AppTasks` 管理）
pub struct AppServices {
    config: Arc<AppConfig>,
    credential_service: Arc<CredentialService>,
    reclaimer: Arc<Reclaimer>,
    health_monitor: Arc<HealthMonitor>,
    cycle_service: Arc<CycleService>,
    journal: Arc<OperationJournal>,
}

impl AppServices {
    /// 根据基础资源初始化业务服务，校验器按配置走 HTTP
    pub fn initialize(resources: &Arc<AppResources>) -> Result<Arc<Self>> {
        let config = resources.config();
        let signer = signer_from_config(&config.signer);
        let validator: Arc<dyn Validator> =
            Arc::new(HttpValidator::new(&config.validator, signer)?);
        Ok(Self::with_validator(resources, validator))
    }

    /// 使用指定校验器组装服务
    #[must_use]
    pub fn with_validator(
        resources: &Arc<AppResources>,
        validator: Arc<dyn Validator>,
    ) -> Arc<Self> {
        let config = resources.config();
        let database = resources.database();

        let store = CredentialStore::new(Arc::clone(&database));
        let journal = OperationJournal::new(Arc::clone(&database));
        let credential_service = CredentialService::new(
            store.clone(),
            journal.clone(),
            validator,
            config.reclaim.validation_batch_cap,
        );
        let reclaimer = Reclaimer::new(
            store.clone(),
            journal.clone(),
            credential_service.clone(),
            config.reclaim.stuck_threshold(),
        );
        let health_monitor = HealthMonitor::new(Arc::clone(&database), store);
        let cycle_service = CycleService::new(database);

        Arc::new(Self {
            config,
            credential_service: Arc::new(credential_service),
            reclaimer: Arc::new(reclaimer),
            health_monitor: Arc::new(health_monitor),
            cycle_service: Arc::new(cycle_service),
            journal: Arc::new(journal),
        })
    }

    #[must_use]
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn credential_service(&self) -> Arc<CredentialService> {
        Arc::clone(&self.credential_service)
    }

    #[must_use]
    pub fn reclaimer(&self) -> Arc<Reclaimer> {
        Arc::clone(&self.reclaimer)
    }

    #[must_use]
    pub fn health_monitor(&self) -> Arc<HealthMonitor> {
        Arc::clone(&self.health_monitor)
    }

    #[must_use]
    pub fn cycle_service(&self) -> Arc<CycleService> {
        Arc::clone(&self.cycle_service)
    }

    #[must_use]
    pub fn journal(&self) -> Arc<OperationJournal> {
        Arc::clone(&self.journal)
    }
}
