//! # Test Support
//!
//! In-memory endpoints for exercising routers without a transport: a
//! recording endpoint that captures outbound frames, a sink that discards
//! them, and a synchronous pair for wiring two routers together.
//!
//! Helpers here panic on malformed frames; they are test fixtures, not
//! production transports.

use crate::endpoint::{Endpoint, EndpointHandle};
use crate::router::Router;
use std::sync::{Arc, Mutex};
use wirebus_proto::{ControlMessage, Frame, JsonSerializer, Serializer};

/// Endpoint that records every outbound frame for later inspection.
#[derive(Default)]
pub struct RecordingEndpoint {
    frames: Mutex<Vec<Frame>>,
}

impl RecordingEndpoint {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All frames sent so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().expect("recording lock").clone()
    }

    /// All frames decoded as control messages, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if any recorded frame is not valid JSON for the protocol.
    #[must_use]
    pub fn messages(&self) -> Vec<ControlMessage> {
        let serializer = JsonSerializer::new();
        self.frames()
            .iter()
            .map(|frame| serializer.decode(frame).expect("recorded frame decodes"))
            .collect()
    }

    /// Decoded messages recorded since the last call, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if any recorded frame is not valid JSON for the protocol.
    #[must_use]
    pub fn take_messages(&self) -> Vec<ControlMessage> {
        let frames: Vec<Frame> = std::mem::take(&mut *self.frames.lock().expect("recording lock"));
        let serializer = JsonSerializer::new();
        frames
            .iter()
            .map(|frame| serializer.decode(frame).expect("recorded frame decodes"))
            .collect()
    }

    /// Discard everything recorded so far.
    pub fn clear(&self) {
        self.frames.lock().expect("recording lock").clear();
    }
}

impl Endpoint for RecordingEndpoint {
    fn send(&self, frame: Frame) {
        self.frames.lock().expect("recording lock").push(frame);
    }
}

/// Endpoint that silently discards every frame.
#[derive(Default)]
pub struct SinkEndpoint;

impl SinkEndpoint {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl Endpoint for SinkEndpoint {
    fn send(&self, _frame: Frame) {}
}

struct PairState {
    peer: Option<EndpointHandle>,
    pending: Vec<Frame>,
}

/// One half of a synchronous in-memory duplex link.
///
/// Frames sent before [`connect`](Self::connect) queue up and are delivered
/// in order once the peer handle is installed, so the `Start` handshake of
/// two routers attached in either order is never lost.
pub struct PairEndpoint {
    state: Mutex<PairState>,
}

impl PairEndpoint {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PairState {
                peer: None,
                pending: Vec::new(),
            }),
        })
    }

    /// Install the peer router's inbound handle and flush queued frames.
    pub fn connect(&self, peer: EndpointHandle) {
        let pending = {
            let mut state = self.state.lock().expect("pair lock");
            state.peer = Some(peer.clone());
            std::mem::take(&mut state.pending)
        };
        for frame in pending {
            peer.receive(frame);
        }
    }
}

impl Endpoint for PairEndpoint {
    fn send(&self, frame: Frame) {
        // Deliver outside the lock; processing a frame can synchronously
        // send frames back through this endpoint.
        let peer = {
            let mut state = self.state.lock().expect("pair lock");
            match &state.peer {
                Some(peer) => peer.clone(),
                None => {
                    state.pending.push(frame);
                    return;
                }
            }
        };
        peer.receive(frame);
    }
}

/// Wire two routers together over a synchronous in-memory link.
///
/// Attaches one [`PairEndpoint`] to each router and cross-connects them; the
/// `Start` handshakes and initial subscription announcements complete before
/// this returns.
///
/// # Panics
///
/// Panics if either router is already closed.
pub fn link(a: &Router, b: &Router) -> (EndpointHandle, EndpointHandle) {
    let to_b = PairEndpoint::new();
    let to_a = PairEndpoint::new();
    let handle_a = a.attach(to_b.clone()).expect("attach to open router");
    let handle_b = b.attach(to_a.clone()).expect("attach to open router");
    to_b.connect(handle_b.clone());
    to_a.connect(handle_a.clone());
    (handle_a, handle_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebus_proto::SourceId;

    #[test]
    fn test_recording_endpoint_captures_in_order() {
        let endpoint = RecordingEndpoint::new();
        let serializer = JsonSerializer::new();
        let first = ControlMessage::Start {
            source: SourceId::random(),
        };
        let second = ControlMessage::Alive {
            source: SourceId::random(),
        };
        endpoint.send(serializer.encode(&first).unwrap());
        endpoint.send(serializer.encode(&second).unwrap());

        let messages = endpoint.messages();
        assert_eq!(messages, vec![first, second]);

        endpoint.clear();
        assert!(endpoint.frames().is_empty());
    }

    #[tokio::test]
    async fn test_pair_endpoint_queues_until_connected() {
        let router = Router::default();
        let pair = PairEndpoint::new();

        let serializer = JsonSerializer::new();
        let frame = serializer
            .encode(&ControlMessage::Alive {
                source: SourceId::random(),
            })
            .unwrap();
        pair.send(frame);

        // Nothing was delivered yet; connecting flushes the queue into the
        // router without panicking or dropping frames.
        let recorder = RecordingEndpoint::new();
        let handle = router.attach(recorder.clone()).unwrap();
        pair.connect(handle);
        assert_eq!(router.endpoint_count(), 1);
    }
}
