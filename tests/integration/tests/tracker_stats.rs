//! Delivery history and statistics behavior across real dispatches.

use herald_core::id;
use herald_integration_tests::{notification, ScriptedFactory};
use herald_plugins::{PluginRegistry, PluginSource};
use herald_routing::{ChannelRouter, DeliveryTracker, RouterConfig, TrackerConfig};
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn fast_config() -> RouterConfig {
    RouterConfig {
        max_concurrency: 5,
        send_timeout: Duration::from_millis(250),
        retry_attempts: 3,
        retry_delay: Duration::from_millis(5),
    }
}

async fn setup(history_size: usize) -> (ChannelRouter, Arc<DeliveryTracker>) {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register(
            PluginSource::User,
            Arc::new(ScriptedFactory::new("a")),
            serde_json::json!({}),
        )
        .await
        .unwrap();

    let tracker = Arc::new(DeliveryTracker::new(TrackerConfig { history_size }));
    let router = ChannelRouter::with_config(registry, tracker.clone(), fast_config());
    (router, tracker)
}

#[tokio::test]
async fn history_evicts_oldest_first() {
    let (router, tracker) = setup(3).await;

    let mut ids = Vec::new();
    for _ in 0..4 {
        let result = router
            .route(&notification(), &["a".to_string()])
            .await
            .unwrap();
        ids.push(result.delivery_id);
    }

    let history = tracker.history().await;
    assert_eq!(history.len(), 3);

    let stored: Vec<&str> = history.iter().map(|r| r.result.delivery_id.as_str()).collect();
    // The first delivery was evicted; the remaining three are in order.
    assert!(!stored.contains(&ids[0].as_str()));
    assert_eq!(stored, vec![ids[1].as_str(), ids[2].as_str(), ids[3].as_str()]);
}

#[tokio::test]
async fn stats_are_idempotent() {
    let (router, tracker) = setup(100).await;
    router
        .route(&notification(), &["a".to_string()])
        .await
        .unwrap();

    let first = tracker.get_delivery_stats().await;
    let second = tracker.get_delivery_stats().await;
    assert_eq!(first, second);
    assert_eq!(first.total_deliveries, 1);
    assert_eq!(first.success_rate, 100.0);
}

#[tokio::test]
async fn stats_fold_over_mixed_outcomes() {
    let registry = Arc::new(PluginRegistry::new());
    let ok = ScriptedFactory::new("ok");
    registry
        .register(PluginSource::User, Arc::new(ok), serde_json::json!({}))
        .await
        .unwrap();
    let broken = ScriptedFactory::new("broken");
    let broken_behavior = broken.behavior();
    broken_behavior.fail_always.store(true, Ordering::SeqCst);
    registry
        .register(PluginSource::User, Arc::new(broken), serde_json::json!({}))
        .await
        .unwrap();

    let tracker = Arc::new(DeliveryTracker::new(TrackerConfig::default()));
    let router = ChannelRouter::with_config(registry, tracker.clone(), fast_config());

    for _ in 0..2 {
        router
            .route(&notification(), &["ok".to_string(), "broken".to_string()])
            .await
            .unwrap();
    }

    let stats = tracker.get_delivery_stats().await;
    assert_eq!(stats.total_deliveries, 2);
    // Partial delivery counts as delivery-level success.
    assert_eq!(stats.successful_deliveries, 2);
    assert_eq!(stats.success_rate, 100.0);

    let ok_stats = &stats.channels["ok"];
    assert_eq!(ok_stats.successes, 2);
    assert_eq!(ok_stats.failures, 0);
    assert_eq!(ok_stats.attempts, 2);

    let broken_stats = &stats.channels["broken"];
    assert_eq!(broken_stats.successes, 0);
    assert_eq!(broken_stats.failures, 2);
    // Each failed delivery exhausted all three attempts.
    assert_eq!(broken_stats.attempts, 6);
}

#[tokio::test]
async fn delivery_ids_are_unique_under_concurrent_generation() {
    let mut handles = Vec::new();
    for _ in 0..16 {
        handles.push(tokio::spawn(async {
            (0..64).map(|_| id::delivery_id()).collect::<Vec<_>>()
        }));
    }

    let mut all = HashSet::new();
    for handle in handles {
        for generated in handle.await.unwrap() {
            assert!(all.insert(generated), "duplicate delivery id generated");
        }
    }
    assert_eq!(all.len(), 16 * 64);
}

#[tokio::test]
async fn concurrent_dispatches_track_independently() {
    let (router, tracker) = setup(100).await;
    let router = Arc::new(router);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            router
                .route(&notification(), &["a".to_string()])
                .await
                .unwrap()
                .delivery_id
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap());
    }
    assert_eq!(ids.len(), 8);
    assert!(tracker.active().await.is_empty());
    assert_eq!(tracker.get_delivery_stats().await.total_deliveries, 8);
}
