//! # Typed Event Bus
//!
//! The router's first-class client: a typed local listener registry with an
//! ambient context handed to every callback. Bound to a [`Router`] it also
//! bridges typed events onto the wire - the first bus listener for a name
//! opens one router subscription (announcing the wire `Subscribe`), the last
//! removal drops it.

use crate::event::BusEvent;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;
use wirebus_router::{LocalSubscription, PublishOptions, Router, SourceId};

/// Raw listener callback: event name, JSON payload, ambient context.
pub type RawCallback<C> = Arc<dyn Fn(&str, Option<&Value>, &C) + Send + Sync>;

/// Handle for one bus registration; pass back to [`EventBus::off`] to
/// remove it.
#[must_use = "dropping the token without off() keeps the listener registered"]
#[derive(Debug)]
pub struct ListenerToken {
    id: u64,
    names: Vec<String>,
}

impl ListenerToken {
    /// The event names this registration covers.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

struct BusListener<C> {
    id: u64,
    cancelled: Arc<AtomicBool>,
    callback: RawCallback<C>,
}

struct BusEntry<C> {
    listeners: Vec<BusListener<C>>,
    router_sub: Option<LocalSubscription>,
}

impl<C> Default for BusEntry<C> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            router_sub: None,
        }
    }
}

struct BusState<C> {
    entries: HashMap<String, BusEntry<C>>,
    next_id: u64,
}

/// Typed event bus with an ambient context of type `C`.
///
/// Every clone shares one listener registry. Unbound, it is a purely local
/// dispatcher; bound to a router, emits also go on the wire and inbound
/// wire data reaches the typed listeners.
pub struct EventBus<C> {
    context: Arc<C>,
    router: Option<Router>,
    state: Arc<Mutex<BusState<C>>>,
}

impl<C> Clone for EventBus<C> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            router: self.router.clone(),
            state: self.state.clone(),
        }
    }
}

impl<C: Send + Sync + 'static> EventBus<C> {
    /// A purely local bus: emits dispatch to local listeners only.
    #[must_use]
    pub fn new(context: Arc<C>) -> Self {
        Self {
            context,
            router: None,
            state: Arc::new(Mutex::new(BusState {
                entries: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// A bus bound to a router: emits also publish on the wire, and wire
    /// data for subscribed names reaches the typed listeners.
    #[must_use]
    pub fn bound(context: Arc<C>, router: Router) -> Self {
        Self {
            context,
            router: Some(router),
            state: Arc::new(Mutex::new(BusState {
                entries: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// The ambient context handed to listeners.
    #[must_use]
    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// The bound router, if any.
    #[must_use]
    pub fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    /// Register a typed listener for `E`.
    ///
    /// A wire payload that fails to deserialize as `E` is dropped with a
    /// warning; it never reaches the callback.
    pub fn on<E: BusEvent>(
        &self,
        callback: impl Fn(E, &C) + Send + Sync + 'static,
    ) -> ListenerToken {
        let raw: RawCallback<C> = Arc::new(move |name, payload, context| {
            let value = payload.cloned().unwrap_or(Value::Null);
            match serde_json::from_value::<E>(value) {
                Ok(event) => callback(event, context),
                Err(error) => {
                    warn!(name, %error, "event payload failed to deserialize, dropped");
                }
            }
        });
        self.register(&[E::NAME], raw)
    }

    /// Register one raw (undeserialized) callback against several event
    /// names at once.
    pub fn on_named(
        &self,
        names: &[&str],
        callback: impl Fn(&str, Option<&Value>, &C) + Send + Sync + 'static,
    ) -> ListenerToken {
        self.register(names, Arc::new(callback))
    }

    fn register(&self, names: &[&str], callback: RawCallback<C>) -> ListenerToken {
        let (id, to_bind) = {
            let mut state = lock(&self.state);
            let id = state.next_id;
            state.next_id += 1;

            let mut to_bind = Vec::new();
            for &name in names {
                let entry = state.entries.entry(name.to_owned()).or_default();
                if entry.listeners.is_empty() && entry.router_sub.is_none() {
                    to_bind.push(name.to_owned());
                }
                entry.listeners.push(BusListener {
                    id,
                    cancelled: Arc::new(AtomicBool::new(false)),
                    callback: callback.clone(),
                });
            }
            (id, to_bind)
        };

        // Open router subscriptions outside the lock; announcing Subscribe
        // can synchronously deliver buffered data back into this bus.
        if let Some(router) = &self.router {
            for name in to_bind {
                let state = self.state.clone();
                let context = self.context.clone();
                let dispatch_name = name.clone();
                let result = router.subscribe(&name, move |payload| {
                    dispatch(&state, &dispatch_name, payload, &context);
                });
                match result {
                    Ok(sub) => {
                        let leftover = {
                            let mut state = lock(&self.state);
                            match state.entries.get_mut(&name) {
                                Some(entry) if entry.router_sub.is_none() => {
                                    entry.router_sub = Some(sub);
                                    None
                                }
                                // Lost a race with a concurrent register, or
                                // every listener was already removed again.
                                _ => Some(sub),
                            }
                        };
                        if let Some(sub) = leftover {
                            router.unsubscribe(sub);
                        }
                    }
                    Err(error) => {
                        warn!(name, %error, "router subscription not opened");
                    }
                }
            }
        }

        ListenerToken {
            id,
            names: names.iter().map(|&n| n.to_owned()).collect(),
        }
    }

    /// Remove a registration.
    ///
    /// Removing the last listener for a name drops its router subscription,
    /// announcing the wire `Unsubscribe`. Safe during dispatch: a listener
    /// removed mid-emit is not invoked again in that pass.
    pub fn off(&self, token: ListenerToken) {
        let to_unbind: Vec<LocalSubscription> = {
            let mut state = lock(&self.state);
            let mut to_unbind = Vec::new();
            for name in &token.names {
                let Some(entry) = state.entries.get_mut(name) else {
                    continue;
                };
                if let Some(position) = entry.listeners.iter().position(|l| l.id == token.id) {
                    entry.listeners[position]
                        .cancelled
                        .store(true, Ordering::Release);
                    entry.listeners.remove(position);
                }
                if entry.listeners.is_empty() {
                    if let Some(sub) = entry.router_sub.take() {
                        to_unbind.push(sub);
                    }
                    state.entries.remove(name);
                }
            }
            to_unbind
        };

        if let Some(router) = &self.router {
            for sub in to_unbind {
                router.unsubscribe(sub);
            }
        }
    }

    /// Emit with fan-out delivery.
    pub fn emit<E: BusEvent>(&self, event: &E) {
        self.emit_options(event, PublishOptions::fan_out(), None);
    }

    /// Emit with round-robin single-consumer delivery.
    pub fn emit_single_consumer<E: BusEvent>(&self, event: &E) {
        self.emit_options(event, PublishOptions::single_consumer(), None);
    }

    /// Emit targeted at one logical source.
    pub fn emit_to<E: BusEvent>(&self, event: &E, target: SourceId) {
        self.emit_options(event, PublishOptions::to_target(target), None);
    }

    /// Emit with fan-out delivery, overriding the ambient context for the
    /// local listeners of this one emit.
    pub fn emit_with_context<E: BusEvent>(&self, event: &E, context: &C) {
        self.emit_options(event, PublishOptions::fan_out(), Some(context));
    }

    fn emit_options<E: BusEvent>(
        &self,
        event: &E,
        options: PublishOptions,
        context: Option<&C>,
    ) {
        let payload = match serde_json::to_value(event) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(error) => {
                warn!(name = E::NAME, %error, "event failed to serialize, dropped");
                return;
            }
        };

        if let Some(router) = &self.router {
            router.publish_with(E::NAME, payload.clone(), options);
        }
        dispatch(
            &self.state,
            E::NAME,
            payload.as_ref(),
            context.unwrap_or(&self.context),
        );
    }
}

/// Invoke every live listener for a name, outside the registry lock.
fn dispatch<C>(
    state: &Arc<Mutex<BusState<C>>>,
    name: &str,
    payload: Option<&Value>,
    context: &C,
) {
    let snapshot: Vec<(Arc<AtomicBool>, RawCallback<C>)> = {
        let state = lock(state);
        state
            .entries
            .get(name)
            .map(|entry| {
                entry
                    .listeners
                    .iter()
                    .map(|l| (l.cancelled.clone(), l.callback.clone()))
                    .collect()
            })
            .unwrap_or_default()
    };

    for (cancelled, callback) in snapshot {
        if !cancelled.load(Ordering::Acquire) {
            callback(name, payload, context);
        }
    }
}

fn lock<C>(state: &Mutex<BusState<C>>) -> MutexGuard<'_, BusState<C>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
