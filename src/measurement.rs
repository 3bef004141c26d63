//! Latest measurement record shared between the control loop and the
//! status interface.
//!
//! One coarse mutex guards the whole record.  The control loop holds it
//! for an entire measurement cycle (including sensor I/O); the report
//! side holds it while rendering.  A reader therefore never sees fields
//! from two different cycles.
//!
//! ```text
//!  ControlEngine ──lock()──▶ ┌──────────────────┐ ◀──read()── SnapshotHandle
//!   (writes)                  │ Mutex<Snapshot>  │              (ReportRenderer)
//!                             └──────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::app::ports::ClimateReading;
use crate::dewpoint::dew_point;
use crate::error::DomainError;

/// One complete indoor/outdoor sample with derived dew points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub indoor_temp: f32,
    pub indoor_hum: f32,
    pub indoor_dew_point: f32,
    pub outdoor_temp: f32,
    pub outdoor_hum: f32,
    pub outdoor_dew_point: f32,
}

impl Sample {
    /// Pair two readings with the dew points they imply.
    ///
    /// The control engine builds every stored sample this way, so a stored
    /// dew point always belongs to the temperature and humidity beside it.
    pub fn derive(indoor: ClimateReading, outdoor: ClimateReading) -> Result<Self, DomainError> {
        Ok(Self {
            indoor_temp: indoor.temperature,
            indoor_hum: indoor.humidity,
            indoor_dew_point: dew_point(indoor.temperature, indoor.humidity)?,
            outdoor_temp: outdoor.temperature,
            outdoor_hum: outdoor.humidity,
            outdoor_dew_point: dew_point(outdoor.temperature, outdoor.humidity)?,
        })
    }

    /// Indoor minus outdoor dew point.
    pub fn dew_point_delta(&self) -> f32 {
        self.indoor_dew_point - self.outdoor_dew_point
    }
}

/// Latest sample plus timestamp and cycle counter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    pub sample: Sample,
    /// Local time of the cycle, `DD.MM.YYYY HH:MM:SS`.
    pub timestamp: String,
    /// Completed cycles since boot (wraps).
    pub counter: u32,
}

/// Commanded vs. observed fan state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanState {
    /// Output written by the control engine.
    pub commanded: bool,
    /// Feedback input; informational only.
    pub sensed: bool,
}

/// Everything the status interface renders, from one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub measurement: Measurement,
    pub fan: FanState,
    /// Duration of the last completed cycle (microseconds).
    pub cycle_duration_us: u64,
}

/// Result of one successful cycle, applied in a single write.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    pub sample: Sample,
    pub timestamp: String,
    pub fan: FanState,
    pub cycle_duration_us: u64,
}

// ───────────────────────────────────────────────────────────────
// Store
// ───────────────────────────────────────────────────────────────

/// Mutex-guarded measurement record.
#[derive(Debug, Default)]
pub struct MeasurementStore {
    inner: Mutex<Snapshot>,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the exclusive lock.  Blocks until any reader or writer is done.
    pub fn lock(&self) -> StoreGuard<'_> {
        // A panic while holding the lock cannot leave a torn record: every
        // write is a single assignment through `StoreGuard::write`.
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        StoreGuard { guard }
    }

    /// Replace the record with one cycle's results and bump the counter.
    pub fn write(&self, record: CycleRecord) -> u32 {
        self.lock().write(record)
    }

    /// Copy out a consistent snapshot.
    pub fn read(&self) -> Snapshot {
        self.lock().snapshot().clone()
    }
}

/// Exclusive access to the record for the lifetime of the guard.
pub struct StoreGuard<'a> {
    guard: MutexGuard<'a, Snapshot>,
}

impl StoreGuard<'_> {
    /// The record as last written.
    pub fn snapshot(&self) -> &Snapshot {
        &self.guard
    }

    /// Apply one cycle.  Returns the new counter value.
    pub fn write(&mut self, record: CycleRecord) -> u32 {
        let counter = self.guard.measurement.counter.wrapping_add(1);
        *self.guard = Snapshot {
            measurement: Measurement {
                sample: record.sample,
                timestamp: record.timestamp,
                counter,
            },
            fan: record.fan,
            cycle_duration_us: record.cycle_duration_us,
        };
        counter
    }
}

// ───────────────────────────────────────────────────────────────
// Read-only handle
// ───────────────────────────────────────────────────────────────

/// Read-only view of a store owned elsewhere.  Cheap to clone and `Send`,
/// so it can be moved into the request-serving thread.
#[derive(Debug, Clone)]
pub struct SnapshotHandle {
    store: Arc<MeasurementStore>,
}

impl SnapshotHandle {
    pub(crate) fn new(store: Arc<MeasurementStore>) -> Self {
        Self { store }
    }

    /// Run `f` on the record while holding the lock.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        let guard = self.store.lock();
        f(guard.snapshot())
    }

    /// Copy out a consistent snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.store.read()
    }
}
