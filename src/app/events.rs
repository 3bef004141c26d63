//! Outbound application events.
//!
//! The [`ControlEngine`](super::engine::ControlEngine) emits these through
//! the [`EventSink`](super::ports::EventSink) port.

use crate::error::Error;
use crate::fsm::StateId;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The engine has started (carries initial state).
    Started(StateId),

    /// A measurement cycle completed and was stored.
    CycleCompleted(CycleSummary),

    /// The fan decision changed.
    FanSwitched { from: StateId, to: StateId },

    /// A cycle was aborted; the previous measurement and fan command stand.
    CycleFailed(Error),
}

/// Compact summary of one completed cycle for logging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSummary {
    pub counter: u32,
    pub indoor_temp: f32,
    pub indoor_hum: f32,
    pub indoor_dew_point: f32,
    pub outdoor_temp: f32,
    pub outdoor_hum: f32,
    pub outdoor_dew_point: f32,
    pub fan_commanded: bool,
    pub fan_sensed: bool,
    pub duration_us: u64,
}
