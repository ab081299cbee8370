//! # Wirebus Test Suite
//!
//! Unified test crate exercising multiple routers wired together over
//! in-memory endpoints, end to end.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── delivery.rs   # Delivery policies across routers
//!     ├── lifecycle.rs  # Handshake, buffering, detach, liveness, close
//!     └── typed_bus.rs  # EventBus client layer over linked routers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p wirebus-tests
//!
//! # By area
//! cargo test -p wirebus-tests integration::delivery::
//! cargo test -p wirebus-tests integration::lifecycle::
//! cargo test -p wirebus-tests integration::typed_bus::
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod integration;

/// Install a stderr tracing subscriber for a test run.
///
/// Honors `RUST_LOG`; call at the top of a test when its router traffic
/// needs to be visible. Safe to call from several tests - later calls are
/// no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
