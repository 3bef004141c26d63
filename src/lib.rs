//! Dew point fan controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod dewpoint;
pub mod error;
pub mod events;
pub mod fsm;
pub mod measurement;
pub mod network;
pub mod pins;
pub mod report;

pub mod adapters;
pub mod drivers;
pub mod sensors;
