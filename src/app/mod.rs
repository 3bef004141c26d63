//! Application core — the fan control decision, zero direct I/O.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod engine;
pub mod events;
pub mod ports;
