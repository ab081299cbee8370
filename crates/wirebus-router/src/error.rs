//! # Router Errors
//!
//! Error types for router operations. Note that `publish` never fails:
//! delivery outcomes are observable only through the local control bus.

use thiserror::Error;

/// Errors from router operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    /// The router has been closed; no further endpoints or subscriptions
    /// can be registered.
    #[error("router is closed")]
    Closed,
}
