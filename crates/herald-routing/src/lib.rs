//! # herald-routing
//!
//! Channel dispatch engine and delivery tracking for Herald.
//!
//! [`ChannelRouter`] turns one notification plus a channel list into a
//! bounded-concurrency, retrying, partial-failure-tolerant delivery:
//! channel names resolve against an injected
//! [`PluginRegistry`](herald_plugins::PluginRegistry), resolved plugins are
//! dispatched in batches with per-channel timeout and retry policy, and the
//! settled responses aggregate into one
//! [`RoutingResult`](herald_core::RoutingResult). The
//! [`DeliveryTracker`] records in-flight and historical deliveries and
//! folds rolling statistics over a bounded history.

pub mod error;
pub mod events;
pub mod router;
pub mod tracker;

pub use error::{Result, RouterError};
pub use events::RouterEvent;
pub use router::{ChannelRouter, RouterConfig};
pub use tracker::{ChannelStats, DeliveryStats, DeliveryTracker, InflightDelivery, TrackerConfig};
