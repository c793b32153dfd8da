//! # 实体定义测试
//!
//! 测试所有 Sea-ORM 实体定义的正确性

#[cfg(test)]
mod tests {
    use crate::{alerts, credential_logs, credentials, cycle_progress, usage_cycles};
    use sea_orm::{EntityName, Iden, Set};

    #[tokio::test]
    async fn test_credential_creation() {
        let credential = credentials::ActiveModel {
            ip: Set("10.0.0.1".to_string()),
            secret: Set("a1=x; web_session=abc".to_string()),
            status: Set(0),
            in_use: Set(false),
            use_count: Set(0),
            ..Default::default()
        };

        assert_eq!(credential.ip.as_ref(), "10.0.0.1");
        assert_eq!(credential.status.as_ref(), &0);
        assert_eq!(credential.in_use.as_ref(), &false);
    }

    #[tokio::test]
    async fn test_alert_creation() {
        let alert = alerts::ActiveModel {
            level: Set(3),
            alert_type: Set("EMPTY_POOL".to_string()),
            message: Set("Cookie池为空，无可用Cookie".to_string()),
            status: Set(0),
            ..Default::default()
        };

        assert_eq!(alert.alert_type.as_ref(), "EMPTY_POOL");
        assert_eq!(alert.level.as_ref(), &3);
    }

    #[tokio::test]
    async fn test_cycle_progress_creation() {
        let progress = cycle_progress::ActiveModel {
            cycle_id: Set(1),
            credential_id: Set(7),
            success: Set(true),
            ..Default::default()
        };

        assert_eq!(progress.cycle_id.as_ref(), &1);
        assert_eq!(progress.success.as_ref(), &true);
    }

    #[test]
    fn test_table_names() {
        assert_eq!(credentials::Entity.table_name(), "credentials");
        assert_eq!(alerts::Entity.table_name(), "alerts");
        assert_eq!(credential_logs::Entity.table_name(), "credential_logs");
        assert_eq!(usage_cycles::Entity.table_name(), "usage_cycles");
        assert_eq!(cycle_progress::Entity.table_name(), "cycle_progress");
    }

    #[test]
    fn test_alert_type_column_name() {
        assert_eq!(alerts::Column::AlertType.to_string(), "type");
    }
}
