//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlEngine (domain)
//! ```
//!
//! Driven adapters (sensors, fan relay, event sinks, radio) implement these
//! traits.  The [`ControlEngine`](super::engine::ControlEngine) and the
//! [`NetworkManager`](crate::network::NetworkManager) consume them via
//! generics, so neither touches hardware directly.

use crate::error::{NetworkError, SensorError};
use crate::network::{LinkStatus, NetInfo, ScanResult};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One temperature/humidity reading.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClimateReading {
    /// Air temperature (°C).
    pub temperature: f32,
    /// Relative humidity (%).
    pub humidity: f32,
}

/// A combined temperature/humidity sensor.
pub trait ClimateSensor {
    /// Identity used to look up calibration offsets.
    fn name(&self) -> &str;

    /// Take one reading.  May block for the duration of the bus transfer.
    fn measure(&mut self) -> Result<ClimateReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Fan port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Fan relay output plus its running-feedback input.
pub trait FanOutput {
    /// Drive the relay (and its indicator) on or off.
    fn set_fan(&mut self, on: bool);

    /// Feedback input: whether the fan is observed running.
    fn fan_running(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Network ports (driven adapters: NetworkManager → radio / clock / LED)
// ───────────────────────────────────────────────────────────────

/// Station-mode radio as seen by the [`NetworkManager`](crate::network::NetworkManager).
pub trait WifiPort {
    /// Deactivate and reactivate the station interface.
    fn reset(&mut self) -> Result<(), NetworkError>;

    /// Station MAC address.
    fn mac(&mut self) -> Result<[u8; 6], NetworkError>;

    fn disable_power_save(&mut self) -> Result<(), NetworkError>;

    /// Visible networks, in the order the radio reports them.
    fn scan(&mut self) -> Result<Vec<ScanResult>, NetworkError>;

    /// Start associating.  Returns once the request is issued.
    fn connect(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError>;

    /// Current link status.
    fn status(&mut self) -> LinkStatus;

    /// Associated with an IP address.
    fn is_connected(&mut self) -> bool;

    /// Assigned addresses, if any.
    fn net_info(&mut self) -> Option<NetInfo>;
}

/// Wall-clock synchronisation against a time server.
pub trait ClockPort {
    fn sync(&mut self, host: &str) -> Result<(), NetworkError>;
}

/// A single LED reporting link progress.
pub trait StatusIndicator {
    fn set(&mut self, on: bool);
    fn toggle(&mut self);
}
