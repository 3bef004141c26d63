//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` holds the inputs of the current cycle (temperatures and
//! dew points), the thresholds, and the fan command the handlers write.

use crate::config::ControlConfig;
use crate::measurement::Sample;

// ---------------------------------------------------------------------------
// Guard predicates
// ---------------------------------------------------------------------------

/// Boolean guards derived from one sample and the thresholds.
///
/// The state table only looks at these, so every transition can be tested
/// without constructing temperatures by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Guards {
    /// `delta > switch_min + hysteresis`
    pub above_switch_on: bool,
    /// `delta < switch_min`
    pub below_switch_off: bool,
    /// Both temperatures at or above their minima.
    pub temperatures_ok: bool,
}

impl Guards {
    pub fn evaluate(sample: &Sample, config: &ControlConfig) -> Self {
        let delta = sample.dew_point_delta();
        Self {
            above_switch_on: delta > config.switch_on_delta(),
            below_switch_off: delta < config.switch_min,
            temperatures_ok: sample.indoor_temp >= config.temp_indoor_min
                && sample.outdoor_temp >= config.temp_outdoor_min,
        }
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The "blackboard" every state handler reads and writes.
#[derive(Debug, Clone)]
pub struct FsmContext {
    pub config: ControlConfig,
    /// Latest sample fed by the control engine.
    pub sample: Sample,
    /// Guards for `sample`, refreshed by [`FsmContext::set_sample`].
    pub guards: Guards,
    /// Fan output requested by the current state.
    pub fan_command: bool,
}

impl FsmContext {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            config,
            sample: Sample::default(),
            guards: Guards::default(),
            fan_command: false,
        }
    }

    /// Install a new sample and recompute guards.
    pub fn set_sample(&mut self, sample: Sample) {
        self.sample = sample;
        self.guards = Guards::evaluate(&sample, &self.config);
    }
}
