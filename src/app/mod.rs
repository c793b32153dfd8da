//! # 应用装配
//!
//! 资源层、服务层与后台任务层的组装和生命周期管理

pub mod periodic;
pub mod resources;
pub mod service_registry;
pub mod task_scheduler;
pub mod tasks;

pub use periodic::PeriodicTask;
pub use resources::AppResources;
pub use service_registry::AppServices;
pub use task_scheduler::{ScheduledTask, TaskScheduler};
pub use tasks::{AppTasks, TaskType};
