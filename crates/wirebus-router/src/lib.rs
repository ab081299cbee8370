//! # Wirebus Router - Subscription Routing and Delivery Engine
//!
//! A logical publish/subscribe overlay that lets independent execution
//! contexts, connected only through raw unordered best-effort duplex
//! endpoints, behave as participants of one shared event bus.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐  attach()   ┌────────────────────┐   send()   ┌──────────┐
//! │ host code  │ ──────────→ │       Router       │ ─────────→ │ Endpoint │
//! │            │  publish()  │  ┌──────────────┐  │            │ (adapter)│
//! │            │ ──────────→ │  │ Subscription │  │  receive() │          │
//! │            │             │  │    Index     │  │ ←───────── │          │
//! └────────────┘             │  └──────────────┘  │            └──────────┘
//!                            │  buffers · cursors │
//!                            │  liveness monitor  │
//!                            └────────────────────┘
//! ```
//!
//! Each participant runs its own [`Router`] instance; there is no central
//! coordinator. Attaching an endpoint triggers a `Start` handshake, after
//! which both sides announce their subscriptions and route published events
//! per the requested delivery policy: fan-out, round-robin single-consumer,
//! or targeted single-consumer. Events published with no current subscriber
//! are buffered briefly; unresponsive peers are evicted by the heartbeat
//! monitor.
//!
//! A tokio runtime context is required: buffer eviction and the liveness
//! monitor run as spawned tasks holding weak router references, so a timer
//! firing after [`Router::close`] is a no-op.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod buffer;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod index;
pub mod notice;
pub mod router;
pub mod testing;

// Re-export main types
pub use config::{PublishOptions, RouterConfig};
pub use endpoint::{Endpoint, EndpointHandle, EndpointId};
pub use error::RouterError;
pub use notice::{NoticeStream, NoticeToken, RouterNotice};
pub use router::{LocalSubscription, Router};

// Re-export the wire layer so hosts depend on one crate.
pub use wirebus_proto::{ControlMessage, Frame, JsonSerializer, NameList, Serializer, SourceId};

use std::time::Duration;

/// Default retention for events published with no current subscriber.
pub const DEFAULT_BUFFER_TIMEOUT: Duration = Duration::from_secs(5);

/// Heartbeat timeout defaults to this many intervals without traffic.
pub const DEFAULT_HEARTBEAT_TIMEOUT_FACTOR: u32 = 3;
