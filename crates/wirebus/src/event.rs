//! The typed event contract.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed event carried over the bus.
///
/// The routing key is the explicit [`NAME`](Self::NAME) constant, never a
/// runtime type name, so renaming a Rust type never changes the wire
/// contract. Payloads cross the wire as JSON; a unit struct serializes to
/// `null` and travels with no payload at all.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use wirebus::BusEvent;
///
/// #[derive(Serialize, Deserialize)]
/// struct BlockSealed {
///     height: u64,
/// }
///
/// impl BusEvent for BlockSealed {
///     const NAME: &'static str = "block.sealed";
/// }
/// ```
pub trait BusEvent: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable event name used as the routing key.
    const NAME: &'static str;
}
