//! # Wirebus Wire Protocol
//!
//! Defines the control messages exchanged between routers and the serializer
//! contract used to move them over a duplex endpoint.
//!
//! ## Protocol
//!
//! ```text
//! ┌──────────┐   Start ──────────────────→  ┌──────────┐
//! │ Router A │   ←────────── Subscribe[..]  │ Router B │
//! │          │   Data{name, payload} ────→  │          │
//! │          │   ←──────────────── Alive    │          │
//! └──────────┘   Close ──────────────────→  └──────────┘
//! ```
//!
//! Six message kinds flow between peers: `Start`, `Subscribe`, `Unsubscribe`,
//! `Data`, `Close` and `Alive`. Every message carries the sender's logical
//! source identity so a peer can group possibly-multiple endpoints under one
//! addressable identity.
//!
//! Unknown message tags decode to [`ControlMessage::Unknown`] and are ignored
//! by receivers, so a newer peer's extra message kinds do not tear down an
//! older router's endpoint.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod error;
pub mod message;
pub mod serializer;

// Re-export main types
pub use error::WireError;
pub use message::{ControlMessage, NameList, SourceId};
pub use serializer::{Frame, JsonSerializer, Serializer};
