//! Observability model: structured event names and field helpers.
//!
//! Library code emits `tracing` events and never initializes a global
//! subscriber; binaries and tests own one-time `tracing_subscriber` setup.

pub mod events;
pub mod fields;
