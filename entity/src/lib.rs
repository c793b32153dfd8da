//! # Entity 模块
//!
//! 包含所有 Sea-ORM 实体定义

pub mod alerts;
pub mod credential_logs;
pub mod credentials;
pub mod cycle_progress;
pub mod usage_cycles;

pub use alerts::Entity as Alerts;
pub use credential_logs::Entity as CredentialLogs;
pub use credentials::Entity as Credentials;
pub use cycle_progress::Entity as CycleProgress;
pub use usage_cycles::Entity as UsageCycles;

#[cfg(test)]
mod tests;
