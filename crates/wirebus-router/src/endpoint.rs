//! # Duplex Endpoint Contract
//!
//! The router depends only on this shape: something with a fire-and-forget
//! `send` plus an inbound path the router installs at attach time. Transport
//! adapters (sockets, broadcast media, worker channels) implement
//! [`Endpoint`] and feed received frames through the [`EndpointHandle`]
//! returned by [`Router::attach`](crate::Router::attach).

use crate::router::RouterInner;
use std::fmt;
use std::sync::Weak;
use wirebus_proto::Frame;

/// Opaque identity of one attached duplex endpoint.
///
/// Assigned at attach; equality is by identity, never by value. Detaching
/// and re-attaching the same transport yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(pub(crate) u64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "endpoint-{}", self.0)
    }
}

/// One duplex communication handle attached to the router.
///
/// `send` transmits one pre-serialized protocol message with no return value
/// and no delivery guarantee; it must never block the caller and must not be
/// assumed to observe back-pressure.
pub trait Endpoint: Send + Sync {
    /// Transmit one encoded protocol message.
    fn send(&self, frame: Frame);
}

/// The router's inbound path for one attached endpoint.
///
/// Returned by [`Router::attach`](crate::Router::attach); the adapter calls
/// [`receive`](Self::receive) once per received message and
/// [`transport_error`](Self::transport_error) when it detects a
/// transport-level failure. The handle holds a weak router reference, so
/// calls arriving after the router was closed or the endpoint detached are
/// no-ops rather than errors.
#[derive(Clone)]
pub struct EndpointHandle {
    pub(crate) id: EndpointId,
    pub(crate) inner: Weak<RouterInner>,
}

impl EndpointHandle {
    /// The identity assigned to this endpoint at attach.
    #[must_use]
    pub fn id(&self) -> EndpointId {
        self.id
    }

    /// Feed one received frame into the router.
    ///
    /// A frame that fails to decode tears the endpoint down exactly as a
    /// `Close` message would: index purge plus one disconnect notification.
    pub fn receive(&self, frame: Frame) {
        if let Some(inner) = self.inner.upgrade() {
            RouterInner::handle_inbound(&inner, self.id, frame);
        }
    }

    /// Report a transport-level failure on this endpoint.
    ///
    /// Treated identically to a decode failure: the endpoint is purged and
    /// the disconnect notification fires.
    pub fn transport_error(&self) {
        if let Some(inner) = self.inner.upgrade() {
            RouterInner::teardown_endpoint(&inner, self.id, "transport error");
        }
    }
}

impl fmt::Debug for EndpointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointHandle").field("id", &self.id).finish()
    }
}
