//! # Router Configuration
//!
//! Timing knobs, the pluggable serializer, and the optional lifecycle
//! callbacks a host can install at construction time.

use crate::endpoint::EndpointId;
use crate::{DEFAULT_BUFFER_TIMEOUT, DEFAULT_HEARTBEAT_TIMEOUT_FACTOR};
use std::sync::Arc;
use std::time::Duration;
use wirebus_proto::{Serializer, SourceId};

/// Callback invoked with the endpoint an event concerns.
pub type EndpointCallback = Arc<dyn Fn(EndpointId) + Send + Sync>;

/// Callback invoked when a peer completes the `Start` handshake.
pub type StartCallback = Arc<dyn Fn(EndpointId, SourceId) + Send + Sync>;

/// Callback invoked on subscription churn for a single event name.
pub type SubscriptionCallback = Arc<dyn Fn(EndpointId, &str, SourceId) + Send + Sync>;

/// Callback invoked when inbound data is accepted for local dispatch.
pub type DataCallback = Arc<dyn Fn(&str, Option<&serde_json::Value>, SourceId) + Send + Sync>;

/// Router construction options.
///
/// All fields have workable defaults: a random logical id, the textual JSON
/// serializer, a buffer timeout of a few seconds, no buffer capacity cap and
/// no heartbeat monitor.
///
/// Buffering is best-effort memory only. With `buffer_capacity` unset a
/// producer publishing without any subscriber can grow the buffer without
/// bound until entries expire; set a capacity if that is a concern (the
/// oldest entry is evicted first on overflow).
#[derive(Clone, Default)]
pub struct RouterConfig {
    /// Logical identity; random if unset.
    pub id: Option<SourceId>,

    /// Wire serializer; textual JSON if unset.
    pub serializer: Option<Arc<dyn Serializer>>,

    /// Retention for events published with no current subscriber.
    /// Defaults to [`DEFAULT_BUFFER_TIMEOUT`].
    pub buffer_timeout: Option<Duration>,

    /// Optional cap on buffered entries per event name.
    pub buffer_capacity: Option<usize>,

    /// Heartbeat emission period; the liveness monitor is disabled if unset.
    pub heartbeat_interval: Option<Duration>,

    /// Silence after which an endpoint is evicted. Defaults to
    /// [`DEFAULT_HEARTBEAT_TIMEOUT_FACTOR`] times the heartbeat interval.
    pub heartbeat_timeout: Option<Duration>,

    /// Invoked when an endpoint is attached.
    pub on_connect: Option<EndpointCallback>,

    /// Invoked exactly once when an endpoint is torn down, whatever the
    /// cause (detach, Close, decode failure, transport error, heartbeat
    /// timeout, disposal).
    pub on_disconnect: Option<EndpointCallback>,

    /// Invoked when a peer's `Start` arrives.
    pub on_start: Option<StartCallback>,

    /// Invoked per event name on an inbound `Subscribe`.
    pub on_subscribe: Option<SubscriptionCallback>,

    /// Invoked per event name on an inbound `Unsubscribe`.
    pub on_unsubscribe: Option<SubscriptionCallback>,

    /// Invoked when inbound `Data` is accepted for local dispatch.
    pub on_data: Option<DataCallback>,
}

impl RouterConfig {
    /// Create a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit logical identity.
    #[must_use]
    pub fn with_id(mut self, id: SourceId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set a non-default wire serializer.
    #[must_use]
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Set the buffer retention timeout.
    #[must_use]
    pub fn with_buffer_timeout(mut self, timeout: Duration) -> Self {
        self.buffer_timeout = Some(timeout);
        self
    }

    /// Cap the number of buffered entries per event name.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Enable the liveness monitor at the given emission period.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Set an explicit eviction timeout for unresponsive endpoints.
    #[must_use]
    pub fn with_heartbeat_timeout(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = Some(timeout);
        self
    }

    /// Install the connect callback.
    #[must_use]
    pub fn on_connect(mut self, callback: impl Fn(EndpointId) + Send + Sync + 'static) -> Self {
        self.on_connect = Some(Arc::new(callback));
        self
    }

    /// Install the disconnect callback.
    #[must_use]
    pub fn on_disconnect(mut self, callback: impl Fn(EndpointId) + Send + Sync + 'static) -> Self {
        self.on_disconnect = Some(Arc::new(callback));
        self
    }

    /// Install the start callback.
    #[must_use]
    pub fn on_start(
        mut self,
        callback: impl Fn(EndpointId, SourceId) + Send + Sync + 'static,
    ) -> Self {
        self.on_start = Some(Arc::new(callback));
        self
    }

    /// Install the subscribe callback.
    #[must_use]
    pub fn on_subscribe(
        mut self,
        callback: impl Fn(EndpointId, &str, SourceId) + Send + Sync + 'static,
    ) -> Self {
        self.on_subscribe = Some(Arc::new(callback));
        self
    }

    /// Install the unsubscribe callback.
    #[must_use]
    pub fn on_unsubscribe(
        mut self,
        callback: impl Fn(EndpointId, &str, SourceId) + Send + Sync + 'static,
    ) -> Self {
        self.on_unsubscribe = Some(Arc::new(callback));
        self
    }

    /// Install the data callback.
    #[must_use]
    pub fn on_data(
        mut self,
        callback: impl Fn(&str, Option<&serde_json::Value>, SourceId) + Send + Sync + 'static,
    ) -> Self {
        self.on_data = Some(Arc::new(callback));
        self
    }

    /// The effective buffer retention timeout.
    #[must_use]
    pub fn effective_buffer_timeout(&self) -> Duration {
        self.buffer_timeout.unwrap_or(DEFAULT_BUFFER_TIMEOUT)
    }

    /// The effective eviction timeout, if the monitor is enabled.
    #[must_use]
    pub fn effective_heartbeat_timeout(&self) -> Option<Duration> {
        let interval = self.heartbeat_interval?;
        Some(
            self.heartbeat_timeout
                .unwrap_or(interval * DEFAULT_HEARTBEAT_TIMEOUT_FACTOR),
        )
    }
}

/// Delivery policy options for a publish call.
///
/// The default is fan-out: one copy to every endpoint subscribed to the
/// name. `single_consumer` without a target picks one subscriber round-robin;
/// with a target it delivers only to that logical source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Deliver to exactly one subscriber instead of fanning out.
    pub single_consumer: bool,

    /// Restrict delivery to the router with this logical identity.
    /// Only meaningful together with `single_consumer`.
    pub target: Option<SourceId>,
}

impl PublishOptions {
    /// Fan-out delivery (the default).
    #[must_use]
    pub fn fan_out() -> Self {
        Self::default()
    }

    /// Round-robin single-consumer delivery.
    #[must_use]
    pub fn single_consumer() -> Self {
        Self {
            single_consumer: true,
            target: None,
        }
    }

    /// Targeted single-consumer delivery.
    #[must_use]
    pub fn to_target(target: SourceId) -> Self {
        Self {
            single_consumer: true,
            target: Some(target),
        }
    }
}
