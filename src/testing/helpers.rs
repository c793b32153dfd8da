//! # 测试辅助函数

use std::sync::{Arc, Once};

use chrono::{Duration, Utc};
use entity::credentials;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryFilter,
};
use sea_orm_migration::MigratorTrait;
use tracing::Level;

use super::fixtures::credential_batch;
use crate::store::CredentialStore;
use crate::types::CredentialId;

static INIT: Once = Once::new();

/// 初始化测试日志，重复调用无副作用
pub fn init_test_env() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// 创建已迁移的内存数据库
///
/// 内存库只保留一个连接，所有并发访问共享同一个库
pub async fn create_test_db() -> Arc<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("连接测试数据库失败");
    migration::Migrator::up(&db, None)
        .await
        .expect("测试数据库迁移失败");

    Arc::new(db)
}

/// 导入 `count` 条凭证（IP 为 10.0.0.1 起），按导入顺序返回 id
pub async fn seed_credentials(store: &CredentialStore, count: usize) -> Vec<CredentialId> {
    let mut ids = Vec::with_capacity(count);
    for item in credential_batch(count) {
        let model = store.create(&item).await.expect("写入测试凭证失败");
        ids.push(model.id);
    }
    ids
}

/// 把出借时间改到 `ago` 之前
pub async fn backdate_last_used(store: &CredentialStore, id: CredentialId, ago: Duration) {
    credentials::Entity::update_many()
        .col_expr(
            credentials::Column::LastUsedAt,
            Expr::value(Utc::now().naive_utc() - ago),
        )
        .filter(credentials::Column::Id.eq(id))
        .exec(store.connection())
        .await
        .expect("修改出借时间失败");
}

/// 让指定凭证之后的所有 UPDATE 都以数据库错误失败
///
/// 其他行与日志表不受影响，用于模拟单行写入故障
pub async fn fail_updates_for(store: &CredentialStore, id: CredentialId) {
    let sql = format!(
        "CREATE TRIGGER fail_update_{id} BEFORE UPDATE ON credentials \
         WHEN OLD.id = {id} BEGIN SELECT RAISE(ABORT, 'row locked'); END;"
    );
    store
        .connection()
        .execute_unprepared(&sql)
        .await
        .expect("创建故障触发器失败");
}

/// 断言包含文本
#[macro_export]
macro_rules! assert_contains {
    ($text:expr, $substring:expr) => {
        assert!(
            $text.contains($substring),
            "Text '{}' does not contain '{}'",
            $text,
            $substring
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_ids_follow_insert_order() {
        init_test_env();
        let store = CredentialStore::new(create_test_db().await);
        let ids = seed_credentials(&store, 3).await;

        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let first = store.find_by_id(ids[0]).await.unwrap().unwrap();
        assert_eq!(first.ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn test_backdate_last_used() {
        let store = CredentialStore::new(create_test_db().await);
        let ids = seed_credentials(&store, 1).await;
        backdate_last_used(&store, ids[0], Duration::hours(2)).await;

        let row = store.find_by_id(ids[0]).await.unwrap().unwrap();
        let age = Utc::now().naive_utc() - row.last_used_at.unwrap();
        assert!(age >= Duration::minutes(119));
    }

    #[tokio::test]
    async fn test_fail_updates_for_only_hits_one_row() {
        let store = CredentialStore::new(create_test_db().await);
        let ids = seed_credentials(&store, 2).await;
        fail_updates_for(&store, ids[0]).await;

        assert!(store.mark_in_use(ids[0]).await.is_err());
        assert!(store.mark_in_use(ids[1]).await.unwrap());
    }

    #[test]
    fn test_assert_contains() {
        assert_contains!("Cookie池为空", "池为空");
    }
}
