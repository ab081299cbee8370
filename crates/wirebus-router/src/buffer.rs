//! # Event Buffer
//!
//! Short-lived retention of events published while no endpoint subscribes to
//! their name. Each entry carries the abort handle of its own eviction task;
//! entries identify themselves by sequence number so a stale timer can never
//! remove a newer entry that reused its slot.
//!
//! The buffer itself is passive bookkeeping: the router spawns the eviction
//! tasks and calls back into [`EventBuffer::remove`] when one fires.

use std::collections::{HashMap, VecDeque};
use tokio::task::AbortHandle;
use tracing::debug;

/// One buffered publish awaiting a subscriber.
#[derive(Debug)]
pub struct BufferedEvent {
    /// Sequence number, unique across the whole buffer.
    pub seq: u64,
    /// The published payload.
    pub payload: Option<serde_json::Value>,
    /// Abort handle of the eviction task; aborted when the entry is dropped
    /// (flush, overflow eviction, disposal).
    timer: Option<AbortHandle>,
}

impl BufferedEvent {
    /// Attach the eviction task spawned for this entry.
    pub fn set_timer(&mut self, timer: AbortHandle) {
        self.timer = Some(timer);
    }
}

impl Drop for BufferedEvent {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Per-name ordered sequences of buffered events.
#[derive(Debug, Default)]
pub struct EventBuffer {
    entries: HashMap<String, VecDeque<BufferedEvent>>,
    next_seq: u64,
}

impl EventBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a payload for a name.
    ///
    /// When `capacity` is set and the name's sequence is full, the oldest
    /// entry is evicted first (its timer aborts on drop).
    ///
    /// # Returns
    ///
    /// The sequence number assigned to the new entry; the caller uses it to
    /// wire up the eviction task via [`attach_timer`](Self::attach_timer).
    pub fn push(
        &mut self,
        name: &str,
        payload: Option<serde_json::Value>,
        capacity: Option<usize>,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;

        let queue = self.entries.entry(name.to_owned()).or_default();
        if let Some(capacity) = capacity {
            while queue.len() >= capacity.max(1) {
                let evicted = queue.pop_front();
                debug!(name, seq = evicted.map(|e| e.seq), "buffer over capacity, oldest entry evicted");
            }
        }
        queue.push_back(BufferedEvent {
            seq,
            payload,
            timer: None,
        });
        seq
    }

    /// Attach the eviction task's abort handle to an entry, if it still
    /// exists (capacity eviction may already have dropped it).
    pub fn attach_timer(&mut self, name: &str, seq: u64, timer: AbortHandle) {
        if let Some(entry) = self
            .entries
            .get_mut(name)
            .and_then(|queue| queue.iter_mut().find(|e| e.seq == seq))
        {
            entry.set_timer(timer);
        } else {
            timer.abort();
        }
    }

    /// Remove one entry by sequence number (eviction-timer path).
    ///
    /// # Returns
    ///
    /// Whether the entry was still present.
    pub fn remove(&mut self, name: &str, seq: u64) -> bool {
        let Some(queue) = self.entries.get_mut(name) else {
            return false;
        };
        let Some(position) = queue.iter().position(|e| e.seq == seq) else {
            return false;
        };
        queue.remove(position);
        if queue.is_empty() {
            self.entries.remove(name);
        }
        true
    }

    /// Drain the full buffered sequence for a name, in original publish
    /// order (flush-to-first-subscriber path). Eviction timers abort as the
    /// entry shells drop.
    pub fn drain(&mut self, name: &str) -> Vec<Option<serde_json::Value>> {
        self.entries
            .remove(name)
            .map(|queue| queue.into_iter().map(|mut e| e.payload.take()).collect())
            .unwrap_or_default()
    }

    /// Drop every buffered entry (disposal path); all timers abort.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of buffered entries for a name.
    #[must_use]
    pub fn len(&self, name: &str) -> usize {
        self.entries.get(name).map_or(0, VecDeque::len)
    }

    /// Whether nothing is buffered at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
