//! GPIO assignments for the controller board (ESP32-S3).
//!
//! Single source of truth; `main` builds every pin driver from these
//! numbers.

// ---------------------------------------------------------------------------
// Climate sensors (DHT22, open-drain single wire with external pull-up)
// ---------------------------------------------------------------------------

pub const INDOOR_DHT_GPIO: i32 = 6;
pub const OUTDOOR_DHT_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Fan
// ---------------------------------------------------------------------------

/// Relay coil driver, HIGH = fan on.
pub const FAN_RELAY_GPIO: i32 = 15;
/// Running feedback from the fan circuit, HIGH = running.
pub const FAN_STATUS_GPIO: i32 = 13;
/// Indicator LED mirroring the relay.
pub const FAN_LED_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Status LEDs
// ---------------------------------------------------------------------------

/// Blinks while associating, solid when connected.
pub const WLAN_LED_GPIO: i32 = 1;
/// Heartbeat from the control loop.
pub const ONBOARD_LED_GPIO: i32 = 21;
