//! Dispatch lifecycle events.

use herald_core::types::ChannelResponse;

/// Lifecycle signals emitted around a dispatch.
///
/// A side channel for logging and metrics subscribers. Emission has no
/// effect on the returned routing result and is lossy when nobody is
/// subscribed.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouterEvent {
    /// A dispatch began after successful resolution.
    DispatchStarted {
        /// Delivery ID assigned by the tracker.
        delivery_id: String,
        /// Resolved channel names, in dispatch order.
        channels: Vec<String>,
    },

    /// One channel's attempt sequence settled.
    ChannelSettled {
        /// Delivery ID of the owning dispatch.
        delivery_id: String,
        /// The settled response.
        response: ChannelResponse,
    },

    /// The whole dispatch settled.
    DispatchCompleted {
        /// Delivery ID of the dispatch.
        delivery_id: String,
        /// Whether at least one channel delivered.
        success: bool,
        /// Channels that delivered.
        successful_channels: usize,
        /// Channels that failed.
        failed_channels: usize,
    },
}
