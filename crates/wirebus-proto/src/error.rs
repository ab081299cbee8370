//! # Wire Errors
//!
//! Error types for encoding and decoding control messages.

use thiserror::Error;

/// Errors produced by a [`Serializer`](crate::Serializer) implementation.
///
/// Carried as plain strings so serializer implementations with arbitrary
/// underlying error types stay object-safe and cloneable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WireError {
    /// A control message could not be encoded into a frame.
    #[error("encode failed: {0}")]
    Encode(String),

    /// A received frame could not be decoded into a control message.
    ///
    /// Receivers treat this as a hard per-endpoint error: the endpoint is
    /// torn down exactly as on a `Close` message.
    #[error("decode failed: {0}")]
    Decode(String),
}
