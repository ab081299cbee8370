//! # Local Control Bus
//!
//! The router re-publishes its own lifecycle (connect, start, subscribe,
//! unsubscribe, data, disconnect) as internally observable notices, so host
//! code and tests can watch protocol traffic without parsing the wire
//! format.
//!
//! Two consumption styles: callback registration with token cancellation
//! (safe to cancel during a dispatch pass), and a broadcast-backed
//! [`NoticeStream`] for async consumers.

use crate::endpoint::EndpointId;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Capacity of the broadcast channel behind [`NoticeStream`].
const NOTICE_CHANNEL_CAPACITY: usize = 256;

/// One observable router lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterNotice {
    /// An endpoint was attached.
    Connected {
        /// The attached endpoint.
        endpoint: EndpointId,
    },
    /// A peer's `Start` handshake arrived on an endpoint.
    Started {
        /// The endpoint the handshake arrived on.
        endpoint: EndpointId,
        /// The peer's logical identity.
        source: wirebus_proto::SourceId,
    },
    /// A peer declared interest in an event name.
    Subscribed {
        /// The endpoint the subscription arrived on.
        endpoint: EndpointId,
        /// The event name.
        name: String,
        /// The subscribing peer's logical identity.
        source: wirebus_proto::SourceId,
    },
    /// A peer withdrew interest in an event name.
    Unsubscribed {
        /// The endpoint the withdrawal arrived on.
        endpoint: EndpointId,
        /// The event name.
        name: String,
        /// The withdrawing peer's logical identity.
        source: wirebus_proto::SourceId,
    },
    /// Inbound data was accepted for local dispatch.
    Data {
        /// The endpoint the data arrived on.
        endpoint: EndpointId,
        /// The event name.
        name: String,
        /// The publishing peer's logical identity.
        source: wirebus_proto::SourceId,
    },
    /// An endpoint was torn down (detach, Close, error or eviction).
    Disconnected {
        /// The removed endpoint.
        endpoint: EndpointId,
    },
}

type NoticeCallback = Arc<dyn Fn(&RouterNotice) + Send + Sync>;

struct NoticeEntry {
    id: u64,
    cancelled: Arc<AtomicBool>,
    callback: NoticeCallback,
}

/// Registry of notice observers.
///
/// Dispatch snapshots the observer list and re-checks each observer's
/// cancelled flag immediately before invoking it, so a token cancelled
/// mid-pass is neither use-after-freed nor invoked again in that pass.
pub(crate) struct NoticeHub {
    observers: Arc<Mutex<Vec<NoticeEntry>>>,
    next_id: AtomicU64,
    broadcast: broadcast::Sender<RouterNotice>,
}

impl NoticeHub {
    pub(crate) fn new() -> Self {
        let (broadcast, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self {
            observers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
            broadcast,
        }
    }

    pub(crate) fn observe(
        &self,
        callback: impl Fn(&RouterNotice) + Send + Sync + 'static,
    ) -> NoticeToken {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        if let Ok(mut observers) = self.observers.lock() {
            observers.push(NoticeEntry {
                id,
                cancelled: cancelled.clone(),
                callback: Arc::new(callback),
            });
        }
        NoticeToken {
            id,
            cancelled,
            observers: self.observers.clone(),
        }
    }

    pub(crate) fn stream(&self) -> NoticeStream {
        NoticeStream {
            receiver: self.broadcast.subscribe(),
        }
    }

    pub(crate) fn emit(&self, notice: &RouterNotice) {
        let snapshot: Vec<(Arc<AtomicBool>, NoticeCallback)> = match self.observers.lock() {
            Ok(observers) => observers
                .iter()
                .map(|entry| (entry.cancelled.clone(), entry.callback.clone()))
                .collect(),
            Err(_) => Vec::new(),
        };
        for (cancelled, callback) in snapshot {
            if !cancelled.load(Ordering::Acquire) {
                callback(notice);
            }
        }
        // Send fails only when nobody streams; that is not an error.
        let _ = self.broadcast.send(notice.clone());
    }
}

/// Cancellation token for one notice observer registration.
///
/// Dropping the token without calling [`cancel`](Self::cancel) leaves the
/// observer registered for the router's lifetime.
#[must_use = "dropping the token without cancel() keeps the observer registered"]
pub struct NoticeToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
    observers: Arc<Mutex<Vec<NoticeEntry>>>,
}

impl NoticeToken {
    /// Remove the observer. Safe to call while a dispatch pass is running:
    /// the observer will not fire again once this returns.
    pub fn cancel(self) {
        self.cancelled.store(true, Ordering::Release);
        if let Ok(mut observers) = self.observers.lock() {
            observers.retain(|entry| entry.id != self.id);
        }
    }
}

/// An async stream of router notices.
///
/// Backed by a broadcast channel; a slow consumer that lags simply skips the
/// overwritten notices.
pub struct NoticeStream {
    receiver: broadcast::Receiver<RouterNotice>,
}

impl NoticeStream {
    /// Receive the next notice.
    ///
    /// # Returns
    ///
    /// - `Some(notice)` - The next notice
    /// - `None` - The router was dropped
    pub async fn recv(&mut self) -> Option<RouterNotice> {
        loop {
            match self.receiver.recv().await {
                Ok(notice) => return Some(notice),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "notice stream lagged, some notices dropped");
                }
            }
        }
    }

    /// Try to receive the next notice without blocking.
    fn try_next(&mut self) -> Result<Option<RouterNotice>, ()> {
        loop {
            match self.receiver.try_recv() {
                Ok(notice) => return Ok(Some(notice)),
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(()),
                Err(broadcast::error::TryRecvError::Lagged(_)) => {}
            }
        }
    }
}

impl Stream for NoticeStream {
    type Item = RouterNotice;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.try_next() {
            Ok(Some(notice)) => Poll::Ready(Some(notice)),
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(()) => Poll::Ready(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn connected(n: u64) -> RouterNotice {
        RouterNotice::Connected {
            endpoint: EndpointId(n),
        }
    }

    #[test]
    fn test_observe_and_emit() {
        let hub = NoticeHub::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let observed = seen.clone();
        let _token = hub.observe(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        hub.emit(&connected(1));
        hub.emit(&connected(2));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cancelled_token_stops_delivery() {
        let hub = NoticeHub::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let observed = seen.clone();
        let token = hub.observe(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        hub.emit(&connected(1));
        token.cancel();
        hub.emit(&connected(2));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_during_dispatch_is_safe() {
        let hub = Arc::new(NoticeHub::new());
        let second_seen = Arc::new(AtomicUsize::new(0));

        // The first observer cancels the second mid-pass; the second must
        // not fire afterwards in the same pass.
        let token_slot: Arc<Mutex<Option<NoticeToken>>> = Arc::new(Mutex::new(None));

        let slot = token_slot.clone();
        let _first = hub.observe(move |_| {
            if let Some(token) = slot.lock().unwrap().take() {
                token.cancel();
            }
        });

        let observed = second_seen.clone();
        let second = hub.observe(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
        });
        *token_slot.lock().unwrap() = Some(second);

        hub.emit(&connected(1));
        hub.emit(&connected(2));
        assert_eq!(second_seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_notice_stream_receives() {
        let hub = NoticeHub::new();
        let mut stream = hub.stream();

        hub.emit(&connected(7));
        let notice = tokio::time::timeout(std::time::Duration::from_secs(1), stream.recv())
            .await
            .expect("stream did not yield in time")
            .expect("notice");
        assert_eq!(notice, connected(7));
    }
}
