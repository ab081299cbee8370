//! # Channel Router
//!
//! One [`Router`] per participant. It owns the subscription index, the
//! event buffer, the round-robin cursors and the endpoint table, and speaks
//! the wire control protocol over every attached duplex endpoint.
//!
//! Inbound messages are dispatched through an explicit match over the closed
//! [`ControlMessage`] enum. All state lives behind one lock; outbound sends
//! and notices are collected while locked and performed after release, so an
//! endpoint whose `send` synchronously re-enters a router cannot deadlock.

use crate::buffer::EventBuffer;
use crate::config::{PublishOptions, RouterConfig};
use crate::endpoint::{Endpoint, EndpointHandle, EndpointId};
use crate::error::RouterError;
use crate::index::SubscriptionIndex;
use crate::notice::{NoticeHub, NoticeStream, NoticeToken, RouterNotice};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};
use wirebus_proto::{ControlMessage, JsonSerializer, NameList, Serializer, SourceId};

/// Callback invoked with the payload of an inbound event.
pub type LocalCallback = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Handle for one registered local listener; pass back to
/// [`Router::unsubscribe`] to remove it.
#[must_use = "dropping the subscription without unsubscribe() keeps the listener registered"]
#[derive(Debug)]
pub struct LocalSubscription {
    pub(crate) name: String,
    pub(crate) id: u64,
}

impl LocalSubscription {
    /// The event name this subscription listens to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct LocalListener {
    id: u64,
    cancelled: Arc<AtomicBool>,
    callback: LocalCallback,
}

struct EndpointEntry {
    transport: Arc<dyn Endpoint>,
    last_seen: Instant,
}

#[derive(Default)]
struct RouterState {
    next_endpoint: u64,
    next_listener: u64,
    endpoints: HashMap<EndpointId, EndpointEntry>,
    index: SubscriptionIndex,
    buffer: EventBuffer,
    cursors: HashMap<String, usize>,
    locals: HashMap<String, Vec<LocalListener>>,
}

pub(crate) struct RouterInner {
    id: SourceId,
    serializer: Arc<dyn Serializer>,
    config: RouterConfig,
    state: Mutex<RouterState>,
    notices: NoticeHub,
    closed: AtomicBool,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

/// The subscription-routing and delivery engine.
///
/// Cheap to clone (all clones share one instance). Requires a tokio runtime
/// context for buffering and heartbeats; tear it down with
/// [`close`](Self::close) from a guaranteed-cleanup position - there is no
/// implicit scope-exit teardown.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Create a router from configuration.
    ///
    /// Spawns the liveness monitor when a heartbeat interval is configured.
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        let id = config.id.unwrap_or_else(SourceId::random);
        let serializer: Arc<dyn Serializer> = config
            .serializer
            .clone()
            .unwrap_or_else(|| Arc::new(JsonSerializer::new()));

        let inner = Arc::new(RouterInner {
            id,
            serializer,
            config,
            state: Mutex::new(RouterState::default()),
            notices: NoticeHub::new(),
            closed: AtomicBool::new(false),
            monitor: Mutex::new(None),
        });

        if let (Some(interval), Some(timeout)) = (
            inner.config.heartbeat_interval,
            inner.config.effective_heartbeat_timeout(),
        ) {
            let handle = RouterInner::spawn_monitor(&inner, interval, timeout);
            *lock_plain(&inner.monitor) = Some(handle);
        }

        debug!(id = %id, "router created");
        Self { inner }
    }

    /// This router's logical source identity.
    #[must_use]
    pub fn id(&self) -> SourceId {
        self.inner.id
    }

    /// Whether [`close`](Self::close) has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Attach a duplex endpoint.
    ///
    /// Sends the `Start` handshake and fires the connect notification. The
    /// returned handle is the endpoint's inbound path into this router.
    ///
    /// # Errors
    ///
    /// [`RouterError::Closed`] if the router was already closed.
    pub fn attach(&self, transport: Arc<dyn Endpoint>) -> Result<EndpointHandle, RouterError> {
        let inner = &self.inner;
        if inner.closed.load(Ordering::SeqCst) {
            return Err(RouterError::Closed);
        }

        let id = {
            let mut state = inner.lock_state();
            let id = EndpointId(state.next_endpoint);
            state.next_endpoint += 1;
            state.endpoints.insert(
                id,
                EndpointEntry {
                    transport: transport.clone(),
                    last_seen: Instant::now(),
                },
            );
            id
        };

        inner.send_message(&*transport, &ControlMessage::Start { source: inner.id });
        inner.emit(RouterNotice::Connected { endpoint: id });
        debug!(endpoint = %id, "endpoint attached");

        Ok(EndpointHandle {
            id,
            inner: Arc::downgrade(inner),
        })
    }

    /// Detach an endpoint: purge every index entry referencing it and fire
    /// the disconnect notification. Unknown ids are ignored.
    pub fn detach(&self, endpoint: EndpointId) {
        RouterInner::teardown_endpoint(&self.inner, endpoint, "detached");
    }

    /// Register a local listener for an event name.
    ///
    /// The name's 0→1 listener transition announces one wire `Subscribe` to
    /// every attached endpoint; further listeners announce nothing.
    ///
    /// # Errors
    ///
    /// [`RouterError::Closed`] if the router was already closed.
    pub fn subscribe(
        &self,
        name: &str,
        callback: impl Fn(Option<&Value>) + Send + Sync + 'static,
    ) -> Result<LocalSubscription, RouterError> {
        let inner = &self.inner;
        if inner.closed.load(Ordering::SeqCst) {
            return Err(RouterError::Closed);
        }

        let (id, announce) = {
            let mut state = inner.lock_state();
            let id = state.next_listener;
            state.next_listener += 1;

            let listeners = state.locals.entry(name.to_owned()).or_default();
            let first = listeners.is_empty();
            listeners.push(LocalListener {
                id,
                cancelled: Arc::new(AtomicBool::new(false)),
                callback: Arc::new(callback),
            });

            let announce = if first {
                state
                    .endpoints
                    .values()
                    .map(|e| e.transport.clone())
                    .collect()
            } else {
                Vec::new()
            };
            (id, announce)
        };

        if !announce.is_empty() {
            debug!(name, "announcing subscription to peers");
        }
        let message = ControlMessage::Subscribe {
            name: name.into(),
            source: inner.id,
        };
        for transport in announce {
            inner.send_message(&*transport, &message);
        }

        Ok(LocalSubscription {
            name: name.to_owned(),
            id,
        })
    }

    /// Remove a local listener.
    ///
    /// The name's 1→0 listener transition announces exactly one wire
    /// `Unsubscribe` to every attached endpoint; removing a non-last
    /// listener announces nothing. Safe to call during event dispatch: a
    /// listener removed mid-pass is not invoked again in that pass.
    pub fn unsubscribe(&self, subscription: LocalSubscription) {
        let inner = &self.inner;

        let announce: Vec<Arc<dyn Endpoint>> = {
            let mut state = inner.lock_state();
            let Some(listeners) = state.locals.get_mut(&subscription.name) else {
                return;
            };
            let Some(position) = listeners.iter().position(|l| l.id == subscription.id) else {
                return;
            };
            listeners[position].cancelled.store(true, Ordering::Release);
            listeners.remove(position);

            if listeners.is_empty() {
                state.locals.remove(&subscription.name);
                state
                    .endpoints
                    .values()
                    .map(|e| e.transport.clone())
                    .collect()
            } else {
                Vec::new()
            }
        };

        if announce.is_empty() {
            return;
        }
        debug!(name = %subscription.name, "announcing unsubscription to peers");
        let message = ControlMessage::Unsubscribe {
            name: subscription.name.as_str().into(),
            source: inner.id,
        };
        for transport in announce {
            inner.send_message(&*transport, &message);
        }
    }

    /// Publish an event with fan-out delivery.
    ///
    /// Never reports an outcome: delivery, buffering and drops are
    /// observable only through the local control bus.
    pub fn publish(&self, name: &str, payload: Option<Value>) {
        self.publish_with(name, payload, PublishOptions::fan_out());
    }

    /// Publish an event with explicit delivery-policy options.
    pub fn publish_with(&self, name: &str, payload: Option<Value>, options: PublishOptions) {
        RouterInner::publish(&self.inner, name, payload, options);
    }

    /// Register a notice observer (local control bus).
    pub fn observe(
        &self,
        callback: impl Fn(&RouterNotice) + Send + Sync + 'static,
    ) -> NoticeToken {
        self.inner.notices.observe(callback)
    }

    /// An async stream of notices (local control bus).
    #[must_use]
    pub fn notices(&self) -> NoticeStream {
        self.inner.notices.stream()
    }

    /// Dispose of the router.
    ///
    /// Idempotent. Stops the liveness monitor and all buffer timers,
    /// announces `Close` to every attached endpoint, detaches them and
    /// clears every mapping; a timer callback firing afterwards is a no-op.
    pub fn close(&self) {
        let inner = &self.inner;
        if inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = lock_plain(&inner.monitor).take() {
            handle.abort();
        }

        let detached: Vec<(EndpointId, Arc<dyn Endpoint>)> = {
            let mut state = inner.lock_state();
            state.buffer.clear();
            state.cursors.clear();
            state.locals.clear();
            state.index = SubscriptionIndex::new();
            state
                .endpoints
                .drain()
                .map(|(id, entry)| (id, entry.transport))
                .collect()
        };

        let message = ControlMessage::Close { source: inner.id };
        for (id, transport) in detached {
            inner.send_message(&*transport, &message);
            inner.emit(RouterNotice::Disconnected { endpoint: id });
        }
        debug!(id = %inner.id, "router closed");
    }

    // ------------------------------------------------------------------
    // Introspection (used by hosts and tests; all read-only)
    // ------------------------------------------------------------------

    /// Names with at least one local listener - the set announced on Start.
    #[must_use]
    pub fn local_event_names(&self) -> Vec<String> {
        self.inner.lock_state().locals.keys().cloned().collect()
    }

    /// Names with at least one remotely subscribed endpoint.
    #[must_use]
    pub fn subscribed_names(&self) -> Vec<String> {
        self.inner.lock_state().index.subscribed_names()
    }

    /// Number of endpoints subscribed to a name.
    #[must_use]
    pub fn endpoints_subscribed(&self, name: &str) -> usize {
        self.inner.lock_state().index.endpoints_for(name).count()
    }

    /// The logical sources subscribed to a name, in announcement order.
    #[must_use]
    pub fn sources_for(&self, name: &str) -> Vec<SourceId> {
        self.inner
            .lock_state()
            .index
            .entries_for(name)
            .iter()
            .map(|e| e.source)
            .collect()
    }

    /// Whether any subscription reference still mentions this source.
    #[must_use]
    pub fn tracks_source(&self, source: SourceId) -> bool {
        self.inner.lock_state().index.tracks_source(source)
    }

    /// Number of currently attached endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.inner.lock_state().endpoints.len()
    }

    /// Number of buffered events for a name.
    #[must_use]
    pub fn buffered_len(&self, name: &str) -> usize {
        self.inner.lock_state().buffer.len(name)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl RouterInner {
    fn lock_state(&self) -> MutexGuard<'_, RouterState> {
        lock_plain(&self.state)
    }

    fn send_message(&self, transport: &dyn Endpoint, message: &ControlMessage) {
        match self.serializer.encode(message) {
            Ok(frame) => transport.send(frame),
            Err(error) => warn!(%error, "outbound message failed to encode, dropped"),
        }
    }

    fn emit(&self, notice: RouterNotice) {
        match &notice {
            RouterNotice::Connected { endpoint } => {
                if let Some(callback) = &self.config.on_connect {
                    callback(*endpoint);
                }
            }
            RouterNotice::Disconnected { endpoint } => {
                if let Some(callback) = &self.config.on_disconnect {
                    callback(*endpoint);
                }
            }
            RouterNotice::Started { endpoint, source } => {
                if let Some(callback) = &self.config.on_start {
                    callback(*endpoint, *source);
                }
            }
            RouterNotice::Subscribed {
                endpoint,
                name,
                source,
            } => {
                if let Some(callback) = &self.config.on_subscribe {
                    callback(*endpoint, name, *source);
                }
            }
            RouterNotice::Unsubscribed {
                endpoint,
                name,
                source,
            } => {
                if let Some(callback) = &self.config.on_unsubscribe {
                    callback(*endpoint, name, *source);
                }
            }
            // The data callback carries the payload; invoked at the data
            // dispatch site instead.
            RouterNotice::Data { .. } => {}
        }
        self.notices.emit(&notice);
    }

    /// Inbound path for one endpoint; called from [`EndpointHandle`].
    pub(crate) fn handle_inbound(inner: &Arc<Self>, endpoint: EndpointId, frame: wirebus_proto::Frame) {
        if inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let message = match inner.serializer.decode(&frame) {
            Ok(message) => message,
            Err(error) => {
                warn!(endpoint = %endpoint, %error, "inbound frame failed to decode");
                Self::teardown_endpoint(inner, endpoint, "decode failure");
                return;
            }
        };

        // Refresh liveness on any decoded inbound message; also drops
        // traffic from endpoints that were already torn down.
        {
            let mut state = inner.lock_state();
            let Some(entry) = state.endpoints.get_mut(&endpoint) else {
                return;
            };
            entry.last_seen = Instant::now();
        }

        match message {
            ControlMessage::Start { source } => Self::handle_start(inner, endpoint, source),
            ControlMessage::Subscribe { name, source } => {
                Self::handle_subscribe(inner, endpoint, &name, source);
            }
            ControlMessage::Unsubscribe { name, source } => {
                Self::handle_unsubscribe(inner, endpoint, &name, source);
            }
            ControlMessage::Data {
                name,
                payload,
                source,
                target,
            } => Self::handle_data(inner, endpoint, &name, payload, source, target),
            ControlMessage::Close { source } => {
                debug!(endpoint = %endpoint, peer = %source, "peer announced close");
                Self::teardown_endpoint(inner, endpoint, "peer closed");
            }
            ControlMessage::Alive { .. } => {}
            // Forward compatibility: a newer peer's extra message kinds
            // must not crash an older router.
            ControlMessage::Unknown => {}
        }
    }

    fn handle_start(inner: &Arc<Self>, endpoint: EndpointId, source: SourceId) {
        let reply = {
            let state = inner.lock_state();
            let Some(entry) = state.endpoints.get(&endpoint) else {
                return;
            };
            let names: Vec<String> = state.locals.keys().cloned().collect();
            (entry.transport.clone(), names)
        };

        // Announce all current event names, as an array even if singleton.
        let (transport, names) = reply;
        inner.send_message(
            &*transport,
            &ControlMessage::Subscribe {
                name: NameList::Many(names),
                source: inner.id,
            },
        );
        inner.emit(RouterNotice::Started { endpoint, source });
    }

    fn handle_subscribe(inner: &Arc<Self>, endpoint: EndpointId, names: &NameList, source: SourceId) {
        let mut flushes: Vec<(Arc<dyn Endpoint>, ControlMessage)> = Vec::new();
        let mut notices: Vec<RouterNotice> = Vec::new();

        {
            let mut state = inner.lock_state();
            let Some(entry) = state.endpoints.get(&endpoint) else {
                return;
            };
            let transport = entry.transport.clone();

            for name in names.iter() {
                let first_endpoint = state.index.add(endpoint, name, source);
                if first_endpoint {
                    let buffered = state.buffer.drain(name);
                    if !buffered.is_empty() {
                        debug!(name, count = buffered.len(), "flushing buffered events to first subscriber");
                    }
                    for payload in buffered {
                        flushes.push((
                            transport.clone(),
                            ControlMessage::Data {
                                name: name.to_owned(),
                                payload,
                                source: inner.id,
                                target: None,
                            },
                        ));
                    }
                }
                notices.push(RouterNotice::Subscribed {
                    endpoint,
                    name: name.to_owned(),
                    source,
                });
            }
        }

        for (transport, message) in flushes {
            inner.send_message(&*transport, &message);
        }
        for notice in notices {
            inner.emit(notice);
        }
    }

    fn handle_unsubscribe(
        inner: &Arc<Self>,
        endpoint: EndpointId,
        names: &NameList,
        source: SourceId,
    ) {
        let notices: Vec<RouterNotice> = {
            let mut state = inner.lock_state();
            if !state.endpoints.contains_key(&endpoint) {
                return;
            }
            names
                .iter()
                .map(|name| {
                    state.index.remove(endpoint, name, source);
                    RouterNotice::Unsubscribed {
                        endpoint,
                        name: name.to_owned(),
                        source,
                    }
                })
                .collect()
        };

        for notice in notices {
            inner.emit(notice);
        }
    }

    fn handle_data(
        inner: &Arc<Self>,
        endpoint: EndpointId,
        name: &str,
        payload: Option<Value>,
        source: SourceId,
        target: Option<SourceId>,
    ) {
        // A broadcast medium echoes the sender's own frames back.
        if source == inner.id {
            return;
        }
        // Targeted data addressed to some other router.
        if target.is_some_and(|t| t != inner.id) {
            return;
        }

        let listeners: Vec<(Arc<AtomicBool>, LocalCallback)> = {
            let state = inner.lock_state();
            if !state.endpoints.contains_key(&endpoint) {
                return;
            }
            state
                .locals
                .get(name)
                .map(|listeners| {
                    listeners
                        .iter()
                        .map(|l| (l.cancelled.clone(), l.callback.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        if let Some(callback) = &inner.config.on_data {
            callback(name, payload.as_ref(), source);
        }
        inner.emit(RouterNotice::Data {
            endpoint,
            name: name.to_owned(),
            source,
        });

        // Snapshot dispatch: a listener cancelled mid-pass is skipped, never
        // invoked twice.
        for (cancelled, callback) in listeners {
            if !cancelled.load(Ordering::Acquire) {
                callback(payload.as_ref());
            }
        }
    }

    fn publish(inner: &Arc<Self>, name: &str, payload: Option<Value>, options: PublishOptions) {
        if inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let sends: Vec<(Arc<dyn Endpoint>, ControlMessage)> = {
            let mut state = inner.lock_state();
            let state = &mut *state;

            if options.single_consumer {
                if let Some(target) = options.target {
                    // Targeted: deliver to the target's endpoints or drop.
                    let endpoints = state.index.endpoints_for_target(name, target);
                    if endpoints.is_empty() {
                        debug!(name, %target, "targeted publish dropped, target not subscribed");
                        return;
                    }
                    let message = ControlMessage::Data {
                        name: name.to_owned(),
                        payload,
                        source: inner.id,
                        target: Some(target),
                    };
                    endpoints
                        .into_iter()
                        .filter_map(|id| {
                            state
                                .endpoints
                                .get(&id)
                                .map(|e| (e.transport.clone(), message.clone()))
                        })
                        .collect()
                } else {
                    // Round-robin: pick one (source, endpoint) entry by the
                    // per-name cursor. Best-effort fairness - the cursor is
                    // not re-validated when subscribers join or leave.
                    let entries = state.index.entries_for(name);
                    if entries.is_empty() {
                        Self::buffer_event(inner, state, name, payload);
                        return;
                    }
                    let cursor = state.cursors.entry(name.to_owned()).or_insert(0);
                    let pick = &entries[*cursor % entries.len()];
                    *cursor += 1;

                    let message = ControlMessage::Data {
                        name: name.to_owned(),
                        payload,
                        source: inner.id,
                        target: Some(pick.source),
                    };
                    state
                        .endpoints
                        .get(&pick.endpoint)
                        .map(|e| vec![(e.transport.clone(), message)])
                        .unwrap_or_default()
                }
            } else {
                // Fan-out: one copy per subscribed endpoint, however many
                // sources it represents.
                let endpoints: Vec<EndpointId> = state.index.endpoints_for(name).collect();
                if endpoints.is_empty() {
                    Self::buffer_event(inner, state, name, payload);
                    return;
                }
                let message = ControlMessage::Data {
                    name: name.to_owned(),
                    payload,
                    source: inner.id,
                    target: None,
                };
                endpoints
                    .into_iter()
                    .filter_map(|id| {
                        state
                            .endpoints
                            .get(&id)
                            .map(|e| (e.transport.clone(), message.clone()))
                    })
                    .collect()
            }
        };

        for (transport, message) in sends {
            inner.send_message(&*transport, &message);
        }
    }

    /// Buffer a publish that found no subscribed endpoint and arm its
    /// eviction timer. Called with the state lock held.
    fn buffer_event(inner: &Arc<Self>, state: &mut RouterState, name: &str, payload: Option<Value>) {
        let timeout = inner.config.effective_buffer_timeout();
        let seq = state
            .buffer
            .push(name, payload, inner.config.buffer_capacity);
        debug!(name, seq, "no subscriber, event buffered");

        let weak = Arc::downgrade(inner);
        let task_name = name.to_owned();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.closed.load(Ordering::SeqCst) {
                return;
            }
            let expired = inner.lock_state().buffer.remove(&task_name, seq);
            if expired {
                debug!(name = %task_name, seq, "buffered event expired unconsumed");
            }
        });
        state.buffer.attach_timer(name, seq, handle.abort_handle());
    }

    /// Tear an endpoint down: purge the index and fire exactly one
    /// disconnect notification. No-op for unknown or already-removed ids.
    pub(crate) fn teardown_endpoint(inner: &Arc<Self>, endpoint: EndpointId, reason: &str) {
        let removed = {
            let mut state = inner.lock_state();
            if state.endpoints.remove(&endpoint).is_none() {
                false
            } else {
                state.index.purge_endpoint(endpoint);
                true
            }
        };

        if removed {
            debug!(endpoint = %endpoint, reason, "endpoint torn down");
            inner.emit(RouterNotice::Disconnected { endpoint });
        }
    }

    fn spawn_monitor(inner: &Arc<Self>, interval: Duration, timeout: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.closed.load(Ordering::SeqCst) {
                    break;
                }
                Self::heartbeat_sweep(&inner, timeout);
            }
        })
    }

    /// One monitor tick: evict endpoints silent past the timeout, send
    /// `Alive` to the rest.
    fn heartbeat_sweep(inner: &Arc<Self>, timeout: Duration) {
        let (stale, alive): (Vec<EndpointId>, Vec<Arc<dyn Endpoint>>) = {
            let state = inner.lock_state();
            let now = Instant::now();
            let mut stale = Vec::new();
            let mut alive = Vec::new();
            for (id, entry) in &state.endpoints {
                if now.duration_since(entry.last_seen) > timeout {
                    stale.push(*id);
                } else {
                    alive.push(entry.transport.clone());
                }
            }
            (stale, alive)
        };

        for endpoint in stale {
            warn!(endpoint = %endpoint, "endpoint evicted, heartbeat timeout");
            Self::teardown_endpoint(inner, endpoint, "heartbeat timeout");
        }

        let message = ControlMessage::Alive { source: inner.id };
        for transport in alive {
            inner.send_message(&*transport, &message);
        }
    }
}

/// Lock helper that survives poisoning instead of panicking; the protected
/// state stays usable because mutations never unwind mid-update.
fn lock_plain<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
