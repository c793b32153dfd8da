use crate::config::AppConfig;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// 应用基础资源：配置与数据库连接
pub struct AppResources {
    config: Arc<AppConfig>,
    database: Arc<DatabaseConnection>,
}

impl AppResources {
    #[must_use]
    pub fn build(config: Arc<AppConfig>, database: Arc<DatabaseConnection>) -> Arc<Self> {
        Arc::new(Self { config, database })
    }

    #[must_use]
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn database(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.database)
    }
}
