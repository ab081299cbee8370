//! # Serializer Contract
//!
//! Pluggable encoding of control messages to a transportable representation.
//! The default is textual JSON; binary codecs plug in through the same trait
//! by emitting [`Frame::Binary`].

use crate::error::WireError;
use crate::message::ControlMessage;

/// A transportable representation of one control message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Human-readable textual encoding.
    Text(String),
    /// Opaque binary encoding.
    Binary(Vec<u8>),
}

/// Encode/decode of control messages to and from frames.
///
/// Implementations must be deterministic enough that round-tripping a control
/// message preserves its tag and fields, and must not fail on `Data` messages
/// without a payload.
pub trait Serializer: Send + Sync {
    /// Encode a control message into a frame.
    fn encode(&self, message: &ControlMessage) -> Result<Frame, WireError>;

    /// Decode a received frame into a control message.
    fn decode(&self, frame: &Frame) -> Result<ControlMessage, WireError>;
}

/// The default textual serializer: one JSON object per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    /// Create the default serializer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Serializer for JsonSerializer {
    fn encode(&self, message: &ControlMessage) -> Result<Frame, WireError> {
        serde_json::to_string(message)
            .map(Frame::Text)
            .map_err(|e| WireError::Encode(e.to_string()))
    }

    fn decode(&self, frame: &Frame) -> Result<ControlMessage, WireError> {
        let result = match frame {
            Frame::Text(text) => serde_json::from_str(text),
            // Tolerate adapters that hand JSON over as raw bytes.
            Frame::Binary(bytes) => serde_json::from_slice(bytes),
        };
        result.map_err(|e| WireError::Decode(e.to_string()))
    }
}
