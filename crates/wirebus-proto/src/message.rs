//! # Control Messages
//!
//! The tagged message shapes exchanged between routers. The wire tag names
//! (`startEvent`, `dataEvent`, ...) are part of the protocol and must stay
//! stable across implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A router's logical source identity.
///
/// Randomly generated per router instance; used to disambiguate a router
/// among possibly-reconnecting endpoints and to address targeted deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(Uuid);

impl SourceId {
    /// Generate a fresh random identity.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One or many event names.
///
/// The singular form is used for ordinary subscription churn; the array form
/// is used for the bulk announcement a router sends in reply to `Start`,
/// listing all of its current event names (as an array even if singleton).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameList {
    /// A single event name.
    One(String),
    /// A bulk announcement of event names.
    Many(Vec<String>),
}

impl NameList {
    /// Iterate over the contained names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::One(name) => std::slice::from_ref(name).iter().map(String::as_str),
            Self::Many(names) => names.as_slice().iter().map(String::as_str),
        }
    }

    /// Number of names contained.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(names) => names.len(),
        }
    }

    /// Whether the list contains no names (only possible in array form).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for NameList {
    fn from(name: &str) -> Self {
        Self::One(name.to_owned())
    }
}

impl From<String> for NameList {
    fn from(name: String) -> Self {
        Self::One(name)
    }
}

impl From<Vec<String>> for NameList {
    fn from(names: Vec<String>) -> Self {
        Self::Many(names)
    }
}

/// All control messages that flow between routers.
///
/// A closed tagged enum matched explicitly by receivers; the `Unknown`
/// variant absorbs tags introduced by newer peers so they can be ignored
/// instead of treated as decode failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Sent immediately on endpoint attach by both sides. Signals readiness;
    /// the receiver replies with a bulk `Subscribe` announcement.
    #[serde(rename = "startEvent")]
    Start {
        /// The sender's logical identity.
        source: SourceId,
    },

    /// Declares interest in one or more event names.
    #[serde(rename = "subscribeEvent")]
    Subscribe {
        /// Event name(s) being subscribed.
        name: NameList,
        /// The sender's logical identity.
        source: SourceId,
    },

    /// Withdraws interest in one or more event names.
    #[serde(rename = "unsubscribeEvent")]
    Unsubscribe {
        /// Event name(s) being unsubscribed.
        name: NameList,
        /// The sender's logical identity.
        source: SourceId,
    },

    /// Carries a published event.
    #[serde(rename = "dataEvent")]
    Data {
        /// The event name.
        name: String,
        /// Opaque application payload; absent payloads are valid.
        #[serde(rename = "data", default, skip_serializing_if = "Option::is_none")]
        payload: Option<serde_json::Value>,
        /// The sender's logical identity.
        source: SourceId,
        /// When set, restricts delivery to the router whose own id matches.
        /// Receivers MUST ignore Data whose target is set and does not match.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<SourceId>,
    },

    /// Graceful teardown announcement.
    #[serde(rename = "closeEvent")]
    Close {
        /// The sender's logical identity.
        source: SourceId,
    },

    /// Heartbeat; liveness proof only, never combined with a payload.
    #[serde(rename = "aliveEvent")]
    Alive {
        /// The sender's logical identity.
        source: SourceId,
    },

    /// A message tag this implementation does not know. Ignored silently.
    #[serde(other)]
    Unknown,
}

impl ControlMessage {
    /// The sender's logical identity, if the message kind carries one.
    #[must_use]
    pub fn source(&self) -> Option<SourceId> {
        match self {
            Self::Start { source }
            | Self::Subscribe { source, .. }
            | Self::Unsubscribe { source, .. }
            | Self::Data { source, .. }
            | Self::Close { source }
            | Self::Alive { source } => Some(*source),
            Self::Unknown => None,
        }
    }
}
