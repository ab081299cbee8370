//! # Wirebus - Typed Event Bus Client Layer
//!
//! Typed events over the channel router. Define an event type, give it a
//! stable name, and emit it; listeners on any participant of the overlay
//! receive it deserialized, together with an ambient context.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//! use wirebus::{BusEvent, EventBus};
//! use wirebus_router::Router;
//!
//! #[derive(Serialize, Deserialize)]
//! struct PeerJoined {
//!     address: String,
//! }
//!
//! impl BusEvent for PeerJoined {
//!     const NAME: &'static str = "peer.joined";
//! }
//!
//! let router = Router::default();
//! let bus = EventBus::bound(Arc::new(()), router);
//! let token = bus.on::<PeerJoined>(|event, _ctx| {
//!     println!("peer joined: {}", event.address);
//! });
//! bus.emit(&PeerJoined { address: "10.0.0.7:9000".into() });
//! bus.off(token);
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod event;

// Re-export main types
pub use bus::{EventBus, ListenerToken, RawCallback};
pub use event::BusEvent;

// The router layer, for hosts that need direct access.
pub use wirebus_router::{PublishOptions, Router, RouterConfig, SourceId};
