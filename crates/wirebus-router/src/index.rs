//! # Subscription Index
//!
//! Four coupled mappings between event names, endpoints and logical source
//! identities, kept mutually consistent behind one mutation surface.
//!
//! Reference counting makes removal safe under multi-subscription: a peer
//! that announced the same (name, source) twice through one endpoint must
//! withdraw it twice before the entry disappears. An event name is a key in
//! the per-name mappings iff it has at least one live entry; purging an
//! endpoint leaves no orphan counts behind.

use crate::endpoint::EndpointId;
use std::collections::HashMap;
use wirebus_proto::SourceId;

/// One (source, endpoint) registration for an event name, with its
/// outstanding subscription count. Kept in announcement order: the
/// round-robin policy walks this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// The subscribing peer's logical identity.
    pub source: SourceId,
    /// The endpoint the subscription was announced through.
    pub endpoint: EndpointId,
    /// Outstanding subscription count for this pair.
    pub count: usize,
}

/// The router's bidirectional subscription bookkeeping.
#[derive(Debug, Default)]
pub struct SubscriptionIndex {
    /// (1) event name → endpoint → reference count.
    name_endpoints: HashMap<String, HashMap<EndpointId, usize>>,

    /// (2) event name → (source, endpoint) entries in announcement order.
    name_sources: HashMap<String, Vec<SourceEntry>>,

    /// (3) source → endpoint → reference count, aggregated across names.
    source_endpoints: HashMap<SourceId, HashMap<EndpointId, usize>>,

    /// (4) endpoint → source → reference count; inverse of (3), used to
    /// recompute source accounting when an endpoint is purged.
    endpoint_sources: HashMap<EndpointId, HashMap<SourceId, usize>>,
}

impl SubscriptionIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one subscription.
    ///
    /// Repeated identical calls keep incrementing reference counts; the
    /// visible endpoint/source sets are idempotent in effect.
    ///
    /// # Returns
    ///
    /// `true` when this is the name's first subscribed endpoint — the
    /// caller's trigger to flush buffered events to it.
    pub fn add(&mut self, endpoint: EndpointId, name: &str, source: SourceId) -> bool {
        let endpoints = self.name_endpoints.entry(name.to_owned()).or_default();
        let first_endpoint = endpoints.is_empty();
        *endpoints.entry(endpoint).or_insert(0) += 1;

        let entries = self.name_sources.entry(name.to_owned()).or_default();
        match entries
            .iter_mut()
            .find(|e| e.source == source && e.endpoint == endpoint)
        {
            Some(entry) => entry.count += 1,
            None => entries.push(SourceEntry {
                source,
                endpoint,
                count: 1,
            }),
        }

        *self
            .source_endpoints
            .entry(source)
            .or_default()
            .entry(endpoint)
            .or_insert(0) += 1;
        *self
            .endpoint_sources
            .entry(endpoint)
            .or_default()
            .entry(source)
            .or_insert(0) += 1;

        first_endpoint
    }

    /// Withdraw one subscription.
    ///
    /// Decrements rather than deletes; an entry leaves a mapping only when
    /// its count reaches zero, and a name leaves the per-name mappings only
    /// when its last endpoint is gone. Unknown triples are ignored.
    pub fn remove(&mut self, endpoint: EndpointId, name: &str, source: SourceId) {
        if let Some(endpoints) = self.name_endpoints.get_mut(name) {
            if let Some(count) = endpoints.get_mut(&endpoint) {
                *count -= 1;
                if *count == 0 {
                    endpoints.remove(&endpoint);
                }
            }
            if endpoints.is_empty() {
                self.name_endpoints.remove(name);
            }
        }

        if let Some(entries) = self.name_sources.get_mut(name) {
            if let Some(position) = entries
                .iter()
                .position(|e| e.source == source && e.endpoint == endpoint)
            {
                entries[position].count -= 1;
                if entries[position].count == 0 {
                    entries.remove(position);
                }
            }
            if entries.is_empty() {
                self.name_sources.remove(name);
            }
        }

        Self::decrement_pair(&mut self.source_endpoints, source, endpoint);
        Self::decrement_pair(&mut self.endpoint_sources, endpoint, source);
    }

    /// Remove every trace of an endpoint, across all names and sources.
    ///
    /// Used on detach and on transport error. Source accounting is recomputed
    /// from mapping (4) so no orphan reference counts remain.
    pub fn purge_endpoint(&mut self, endpoint: EndpointId) {
        self.name_endpoints.retain(|_, endpoints| {
            endpoints.remove(&endpoint);
            !endpoints.is_empty()
        });

        self.name_sources.retain(|_, entries| {
            entries.retain(|e| e.endpoint != endpoint);
            !entries.is_empty()
        });

        if let Some(sources) = self.endpoint_sources.remove(&endpoint) {
            for source in sources.keys() {
                let now_empty = match self.source_endpoints.get_mut(source) {
                    Some(endpoints) => {
                        endpoints.remove(&endpoint);
                        endpoints.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.source_endpoints.remove(source);
                }
            }
        }
    }

    /// The endpoints currently subscribed to a name (fan-out view).
    pub fn endpoints_for(&self, name: &str) -> impl Iterator<Item = EndpointId> + '_ {
        self.name_endpoints
            .get(name)
            .into_iter()
            .flat_map(|endpoints| endpoints.keys().copied())
    }

    /// Whether a name has at least one subscribed endpoint.
    #[must_use]
    pub fn has_endpoints(&self, name: &str) -> bool {
        self.name_endpoints.contains_key(name)
    }

    /// The (source, endpoint) entries for a name in announcement order
    /// (round-robin view).
    #[must_use]
    pub fn entries_for(&self, name: &str) -> &[SourceEntry] {
        self.name_sources.get(name).map_or(&[], Vec::as_slice)
    }

    /// The endpoints registered under one logical source for a name
    /// (targeted view), deduplicated.
    #[must_use]
    pub fn endpoints_for_target(&self, name: &str, target: SourceId) -> Vec<EndpointId> {
        let mut endpoints: Vec<EndpointId> = self
            .entries_for(name)
            .iter()
            .filter(|e| e.source == target)
            .map(|e| e.endpoint)
            .collect();
        endpoints.dedup();
        endpoints
    }

    /// All names with at least one subscribed endpoint.
    #[must_use]
    pub fn subscribed_names(&self) -> Vec<String> {
        self.name_endpoints.keys().cloned().collect()
    }

    /// Whether any reference count still mentions this source.
    #[must_use]
    pub fn tracks_source(&self, source: SourceId) -> bool {
        self.source_endpoints.contains_key(&source)
    }

    /// Whether any reference count still mentions this endpoint.
    #[must_use]
    pub fn tracks_endpoint(&self, endpoint: EndpointId) -> bool {
        self.endpoint_sources.contains_key(&endpoint)
    }

    /// Whether the index holds no state at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_endpoints.is_empty()
            && self.name_sources.is_empty()
            && self.source_endpoints.is_empty()
            && self.endpoint_sources.is_empty()
    }

    fn decrement_pair<K, V>(map: &mut HashMap<K, HashMap<V, usize>>, outer: K, inner: V)
    where
        K: std::hash::Hash + Eq,
        V: std::hash::Hash + Eq,
    {
        if let Some(counts) = map.get_mut(&outer) {
            if let Some(count) = counts.get_mut(&inner) {
                *count -= 1;
                if *count == 0 {
                    counts.remove(&inner);
                }
            }
            if counts.is_empty() {
                map.remove(&outer);
            }
        }
    }
}
