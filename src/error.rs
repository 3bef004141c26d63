//! Unified error types for the dew point fan controller firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! control loop can report a failed cycle without caring where it failed.
//! All variants are `Copy` so they can travel through events and logs
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A climate sensor could not be read.
    Sensor(SensorError),
    /// Dew point is undefined for the sampled temperature/humidity pair.
    DewPoint(DomainError),
    /// A network operation failed.
    Network(NetworkError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::DewPoint(e) => write!(f, "dew point: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor did not answer the start signal.
    NoResponse,
    /// A bit pulse did not finish within the protocol window.
    Timeout,
    /// The frame checksum did not match.
    Checksum,
    /// GPIO access failed.
    Gpio,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response"),
            Self::Timeout => write!(f, "timeout"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::Gpio => write!(f, "GPIO access failed"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Dew point domain errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainError {
    /// Actual vapor pressure ratio is zero or negative (log undefined).
    NonPositiveVaporPressure,
    /// An input or the result is NaN or infinite.
    NotFinite,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveVaporPressure => write!(f, "vapor pressure ratio not positive"),
            Self::NotFinite => write!(f, "value not finite"),
        }
    }
}

impl From<DomainError> for Error {
    fn from(e: DomainError) -> Self {
        Self::DewPoint(e)
    }
}

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// The radio reported an all-zero MAC address.
    InvalidMac,
    /// The scan itself failed.
    ScanFailed,
    /// None of the known SSIDs is visible.
    NoKnownNetwork,
    /// The link did not come up; carries the last reported status.
    ConnectFailed(crate::network::LinkStatus),
    /// The radio driver rejected an operation.
    Driver,
    /// Time synchronisation failed.
    ClockSync,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMac => write!(f, "invalid MAC address"),
            Self::ScanFailed => write!(f, "scan failed"),
            Self::NoKnownNetwork => write!(f, "no known network visible"),
            Self::ConnectFailed(status) => write!(f, "no connection ({status})"),
            Self::Driver => write!(f, "driver error"),
            Self::ClockSync => write!(f, "clock sync failed"),
        }
    }
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
