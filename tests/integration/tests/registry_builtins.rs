//! Built-in installation and source-precedence behavior, end to end.

use herald_integration_tests::{notification, ScriptedFactory};
use herald_plugins::builtin::builtin_factories;
use herald_plugins::{InstallOutcome, PluginRegistry, PluginSource, PluginState};
use herald_routing::{ChannelRouter, DeliveryTracker, TrackerConfig};
use std::sync::Arc;

#[tokio::test]
async fn builtins_install_and_console_delivers() {
    let registry = Arc::new(PluginRegistry::new());
    let outcomes = registry
        .install(PluginSource::Builtin, builtin_factories())
        .await;

    assert_eq!(outcomes.len(), 2);
    for outcome in &outcomes {
        assert!(matches!(outcome, InstallOutcome::Installed { .. }));
    }

    // Console is always available; the webhook has no URL yet.
    assert_eq!(
        registry.state("console").await.unwrap(),
        PluginState::Ready
    );
    assert_eq!(
        registry.state("webhook").await.unwrap(),
        PluginState::Unavailable
    );

    let tracker = Arc::new(DeliveryTracker::new(TrackerConfig::default()));
    let router = ChannelRouter::new(registry, tracker);

    // The unavailable webhook is dropped; the console delivers.
    let result = router
        .route(
            &notification(),
            &["console".to_string(), "webhook".to_string()],
        )
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.total_channels, 1);
    assert_eq!(result.responses[0].channel, "console");
}

#[tokio::test]
async fn user_plugin_shadows_builtin_of_same_name() {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .install(PluginSource::Builtin, builtin_factories())
        .await;

    let replacement = ScriptedFactory::new("console");
    let behavior = replacement.behavior();
    registry
        .register(
            PluginSource::User,
            Arc::new(replacement),
            serde_json::json!({}),
        )
        .await
        .unwrap();

    assert_eq!(
        registry.lookup("console").await.unwrap().source(),
        PluginSource::User
    );

    let tracker = Arc::new(DeliveryTracker::new(TrackerConfig::default()));
    let router = ChannelRouter::new(registry, tracker);
    let result = router
        .route(&notification(), &["console".to_string()])
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        behavior.send_calls.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn capability_filter_finds_builtins() {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .install(PluginSource::Builtin, builtin_factories())
        .await;

    let text = registry.filter_by_capability("text").await;
    assert_eq!(text.len(), 2);

    let json = registry.filter_by_capability("json").await;
    assert_eq!(json.len(), 1);
    assert_eq!(json[0].name(), "webhook");
}
