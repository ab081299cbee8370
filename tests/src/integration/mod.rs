//! Cross-router integration tests.

pub mod delivery;
pub mod lifecycle;
pub mod typed_bus;
