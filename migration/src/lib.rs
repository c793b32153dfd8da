pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_credentials_table;
mod m20250301_000002_create_credential_logs_table;
mod m20250301_000003_create_alerts_table;
mod m20250301_000004_create_usage_cycles_table;
mod m20250301_000005_create_cycle_progress_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_credentials_table::Migration),
            Box::new(m20250301_000002_create_credential_logs_table::Migration),
            Box::new(m20250301_000003_create_alerts_table::Migration),
            Box::new(m20250301_000004_create_usage_cycles_table::Migration),
            Box::new(m20250301_000005_create_cycle_progress_table::Migration),
        ]
    }
}
