//! # 并发借出测试
//!
//! 多个任务同时借出时，同一凭证只会交给一个调用方

use std::collections::HashSet;
use std::sync::Arc;

use cookie_pool::app::{AppResources, AppServices};
use cookie_pool::config::AppConfig;
use cookie_pool::testing::{StaticValidator, create_test_db, credential_batch, init_test_env};
use futures::future::join_all;

async fn services() -> Arc<AppServices> {
    init_test_env();
    let resources = AppResources::build(Arc::new(AppConfig::default()), create_test_db().await);
    AppServices::with_validator(&resources, Arc::new(StaticValidator::new(true)))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_never_share_a_credential() {
    let services = services().await;
    let credentials = services.credential_service();
    credentials.import(credential_batch(3)).await.unwrap();

    let attempts = (0..10).map(|_| {
        let credentials = Arc::clone(&credentials);
        tokio::spawn(async move { credentials.checkout().await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let leased: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    let distinct: HashSet<_> = leased.iter().map(|lease| lease.id).collect();
    assert_eq!(leased.len(), 3);
    assert_eq!(distinct.len(), 3);
    assert!(leased.iter().all(|lease| lease.use_count == 1));

    let failures: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(failures.len(), 7);
    assert!(failures.iter().all(|e| e.is_not_found()));

    let stats = credentials.statistics().await.unwrap();
    assert_eq!((stats.total, stats.available, stats.using), (3, 0, 3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn released_credentials_are_leased_again() {
    let services = services().await;
    let credentials = services.credential_service();
    credentials.import(credential_batch(2)).await.unwrap();

    for _ in 0..3 {
        let first = credentials.checkout().await.unwrap();
        let second = credentials.checkout().await.unwrap();
        assert_ne!(first.id, second.id);
        assert!(credentials.checkout().await.unwrap_err().is_not_found());

        let (a, b) = tokio::join!(credentials.release(first.id), credentials.release(second.id));
        a.unwrap();
        b.unwrap();
    }

    let stats = credentials.statistics().await.unwrap();
    assert_eq!(stats.available, 2);
    assert_eq!(stats.total_use_count, 6);
}
