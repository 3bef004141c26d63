//! Sensor subsystem — the DHT22 driver and the calibration wrapper.
//!
//! Raw readings pass through [`CalibratedSensor`], which adds the
//! per-sensor offsets from the configuration before the control engine
//! ever sees them.

pub mod dht22;

use crate::app::ports::{ClimateReading, ClimateSensor};
use crate::config::SensorCalibration;
use crate::error::SensorError;

/// Applies additive temperature/humidity offsets to an inner sensor.
pub struct CalibratedSensor<S> {
    inner: S,
    offset_temp: f32,
    offset_hum: f32,
}

impl<S: ClimateSensor> CalibratedSensor<S> {
    pub fn new(inner: S, calibration: &SensorCalibration) -> Self {
        log::info!(
            "Sensor '{}': offset_temp={} offset_hum={}",
            inner.name(),
            calibration.offset_temp,
            calibration.offset_hum
        );
        Self {
            inner,
            offset_temp: calibration.offset_temp,
            offset_hum: calibration.offset_hum,
        }
    }
}

impl<S: ClimateSensor> ClimateSensor for CalibratedSensor<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        let raw = self.inner.measure()?;
        Ok(ClimateReading {
            temperature: raw.temperature + self.offset_temp,
            humidity: raw.humidity + self.offset_hum,
        })
    }
}
