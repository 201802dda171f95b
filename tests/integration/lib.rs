//! Shared fixtures for Herald integration tests.
//!
//! [`ScriptedFactory`] builds plugins whose behavior is controlled from
//! the test through atomics: scripted failure counts, artificial send
//! delays, and a toggleable availability probe. A shared [`FlightGauge`]
//! measures how many sends are in flight at once across all scripted
//! plugins, which is how the concurrency-ceiling properties are asserted.

use async_trait::async_trait;
use herald_core::types::NotificationRequest;
use herald_plugins::{
    NotificationPlugin, PluginDescriptor, PluginError, PluginFactory, SendReceipt,
};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts concurrently running sends across every plugin sharing it.
#[derive(Default)]
pub struct FlightGauge {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl FlightGauge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Highest number of simultaneously in-flight sends observed.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Decrements the gauge even when the send future is dropped by a
/// timeout.
struct FlightGuard(Arc<FlightGauge>);

impl FlightGuard {
    fn enter(gauge: Arc<FlightGauge>) -> Self {
        let now = gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        gauge.peak.fetch_max(now, Ordering::SeqCst);
        Self(gauge)
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scripted behavior shared between a test and its plugin instances.
pub struct Behavior {
    /// Number of leading send attempts that fail before success.
    pub fail_first: AtomicU32,
    /// Fail every send attempt.
    pub fail_always: AtomicBool,
    /// Artificial delay applied to every send, in milliseconds.
    pub delay_ms: AtomicU64,
    /// What the availability probe reports.
    pub available: AtomicBool,
    /// Send invocations observed.
    pub send_calls: AtomicU32,
}

impl Behavior {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_first: AtomicU32::new(0),
            fail_always: AtomicBool::new(false),
            delay_ms: AtomicU64::new(0),
            available: AtomicBool::new(true),
            send_calls: AtomicU32::new(0),
        })
    }
}

struct ScriptedPlugin {
    descriptor: PluginDescriptor,
    behavior: Arc<Behavior>,
    gauge: Option<Arc<FlightGauge>>,
}

#[async_trait]
impl NotificationPlugin for ScriptedPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    async fn send(
        &self,
        _notification: &NotificationRequest,
        _options: Option<&serde_json::Value>,
    ) -> herald_plugins::Result<SendReceipt> {
        self.behavior.send_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.gauge.clone().map(FlightGuard::enter);

        let delay = self.behavior.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.behavior.fail_always.load(Ordering::SeqCst) {
            return Err(PluginError::send("scripted failure"));
        }
        let remaining = self.behavior.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.behavior.fail_first.store(remaining - 1, Ordering::SeqCst);
            return Err(PluginError::send("scripted failure"));
        }
        Ok(SendReceipt::new("scripted delivery"))
    }

    async fn is_available(&self) -> bool {
        self.behavior.available.load(Ordering::SeqCst)
    }
}

/// Factory for scripted plugins. Instances share one [`Behavior`], so a
/// test keeps control after registration (and across registry reloads).
pub struct ScriptedFactory {
    descriptor: PluginDescriptor,
    behavior: Arc<Behavior>,
    gauge: Option<Arc<FlightGauge>>,
}

impl ScriptedFactory {
    pub fn new(name: &str) -> Self {
        Self {
            descriptor: PluginDescriptor::new(name, name.to_uppercase(), "1.0.0", "herald-tests")
                .with_capability("text"),
            behavior: Behavior::new(),
            gauge: None,
        }
    }

    /// Attach a shared in-flight gauge.
    pub fn with_gauge(mut self, gauge: Arc<FlightGauge>) -> Self {
        self.gauge = Some(gauge);
        self
    }

    /// Handle to the scripted behavior.
    pub fn behavior(&self) -> Arc<Behavior> {
        self.behavior.clone()
    }
}

impl PluginFactory for ScriptedFactory {
    fn descriptor(&self) -> PluginDescriptor {
        self.descriptor.clone()
    }

    fn create(&self) -> Box<dyn NotificationPlugin> {
        Box::new(ScriptedPlugin {
            descriptor: self.descriptor.clone(),
            behavior: self.behavior.clone(),
            gauge: self.gauge.clone(),
        })
    }
}

/// A minimal valid notification.
pub fn notification() -> NotificationRequest {
    NotificationRequest::new("T", "M")
}
