//! Control engine — the hexagonal core.
//!
//! [`ControlEngine`] owns the fan FSM, both climate sensors, the fan
//! output, and the measurement store.  One call to
//! [`measure_and_decide`](ControlEngine::measure_and_decide) is one
//! complete cycle, run entirely under the store lock:
//!
//! ```text
//!  lock ─▶ indoor ─▶ outdoor ─▶ dew points ─▶ FSM ─▶ fan ─▶ write ─▶ unlock
//! ```
//!
//! Any failure before the write aborts the cycle: the previous record and
//! fan command stay in place and the next tick simply tries again.

use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};

use crate::config::ControlConfig;
use crate::error::Error;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::measurement::{CycleRecord, FanState, MeasurementStore, Sample, SnapshotHandle};

use super::events::{AppEvent, CycleSummary};
use super::ports::{ClimateSensor, EventSink, FanOutput};

/// Orchestrates one measurement/decision cycle per call.
pub struct ControlEngine<I, O, F> {
    indoor: I,
    outdoor: O,
    fan: F,
    fsm: Fsm,
    ctx: FsmContext,
    store: Arc<MeasurementStore>,
}

impl<I, O, F> ControlEngine<I, O, F>
where
    I: ClimateSensor,
    O: ClimateSensor,
    F: FanOutput,
{
    /// Construct the engine.  Does **not** drive the fan; call [`start`](Self::start) next.
    pub fn new(config: ControlConfig, indoor: I, outdoor: O, fan: F) -> Self {
        Self {
            indoor,
            outdoor,
            fan,
            fsm: Fsm::new(build_state_table(), StateId::FanOff),
            ctx: FsmContext::new(config),
            store: Arc::new(MeasurementStore::new()),
        }
    }

    /// Enter the initial state and apply its fan command.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.fan.set_fan(self.ctx.fan_command);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("ControlEngine started in {:?}", self.fsm.current_state());
    }

    /// Run one cycle.  Returns the new measurement counter.
    ///
    /// The store lock is held from before the first sensor read until the
    /// record is written, so a concurrent report waits for the whole cycle.
    pub fn measure_and_decide(
        &mut self,
        timestamp: &str,
        sink: &mut impl EventSink,
    ) -> Result<u32, Error> {
        let store = Arc::clone(&self.store);
        let mut guard = store.lock();
        let started = Instant::now();

        let sample = match self.sample() {
            Ok(s) => s,
            Err(e) => {
                drop(guard);
                warn!("Measure {}: cycle aborted ({}), keeping previous state", timestamp, e);
                sink.emit(&AppEvent::CycleFailed(e));
                return Err(e);
            }
        };

        self.ctx.set_sample(sample);
        let transition = self.fsm.tick(&mut self.ctx);

        self.fan.set_fan(self.ctx.fan_command);
        let fan = FanState {
            commanded: self.ctx.fan_command,
            sensed: self.fan.fan_running(),
        };

        let duration_us = started.elapsed().as_micros() as u64;
        let counter = guard.write(CycleRecord {
            sample,
            timestamp: timestamp.into(),
            fan,
            cycle_duration_us: duration_us,
        });
        drop(guard);

        info!("Measure: {}, Duration: {} us", timestamp, duration_us);

        if let Some((from, to)) = transition {
            sink.emit(&AppEvent::FanSwitched { from, to });
        }
        sink.emit(&AppEvent::CycleCompleted(CycleSummary {
            counter,
            indoor_temp: sample.indoor_temp,
            indoor_hum: sample.indoor_hum,
            indoor_dew_point: sample.indoor_dew_point,
            outdoor_temp: sample.outdoor_temp,
            outdoor_hum: sample.outdoor_hum,
            outdoor_dew_point: sample.outdoor_dew_point,
            fan_commanded: fan.commanded,
            fan_sensed: fan.sensed,
            duration_us,
        }));

        Ok(counter)
    }

    /// Read-only access to the store for the status interface.
    pub fn snapshot_handle(&self) -> SnapshotHandle {
        SnapshotHandle::new(self.store.clone())
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Indoor first, then outdoor; dew points derived in the same pass.
    fn sample(&mut self) -> Result<Sample, Error> {
        let indoor = self.indoor.measure()?;
        let outdoor = self.outdoor.measure()?;
        Ok(Sample::derive(indoor, outdoor)?)
    }
}
