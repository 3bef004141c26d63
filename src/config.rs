//! System configuration parameters
//!
//! Loaded once at startup from two JSON documents (public config and
//! Wi-Fi secrets) and immutable afterwards.  Every component gets the
//! section it needs by reference or by value at construction time.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Maximum number of known Wi-Fi networks.
pub const MAX_KNOWN_NETWORKS: usize = 8;

/// Maximum number of sensor calibration entries.
pub const MAX_CALIBRATIONS: usize = 4;

// ---------------------------------------------------------------------------
// Control thresholds
// ---------------------------------------------------------------------------

/// Thresholds for the hysteretic fan decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Minimum dew point difference (°C) at which the fan switches.
    pub switch_min: f32,
    /// Distance (°C) between switch-off and switch-on point.
    pub hysteresis: f32,
    /// Minimum indoor temperature (°C) at which ventilation is allowed.
    pub temp_indoor_min: f32,
    /// Minimum outdoor temperature (°C) at which ventilation is allowed.
    pub temp_outdoor_min: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            switch_min: 5.0,
            hysteresis: 1.0,
            temp_indoor_min: 10.0,
            temp_outdoor_min: -10.0,
        }
    }
}

impl ControlConfig {
    /// Dew point difference above which the fan switches on.
    pub fn switch_on_delta(&self) -> f32 {
        self.switch_min + self.hysteresis
    }
}

// ---------------------------------------------------------------------------
// Network
// ---------------------------------------------------------------------------

/// One known access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownNetwork {
    pub ssid: String<32>,
    pub password: String<64>,
}

/// Wi-Fi station settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Two-letter regulatory country code.
    pub country: String<2>,
    pub hostname: String<32>,
    /// SNTP server used after a successful connection.
    pub ntp_host: String<64>,
    /// Ordered list of known networks.
    pub known_networks: heapless::Vec<KnownNetwork, MAX_KNOWN_NETWORKS>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            country: str_field("CH"),
            hostname: str_field("dewfan"),
            ntp_host: str_field("1.europe.pool.ntp.org"),
            known_networks: heapless::Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor calibration
// ---------------------------------------------------------------------------

/// Additive offsets for one sensor, keyed by sensor name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorCalibration {
    pub sensor: String<16>,
    pub offset_temp: f32,
    pub offset_hum: f32,
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Loop cadences and retry budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Base tick period (milliseconds).
    pub tick_ms: u32,
    /// Run a measurement cycle every N ticks.
    pub measure_every_ticks: u32,
    /// Hardware watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,
    /// Connection attempts before giving up.
    pub connect_attempts: u8,
    /// Link status polls per attempt.
    pub status_polls: u8,
    /// Half period of the indicator blink between status polls (milliseconds).
    pub poll_half_period_ms: u32,
    /// Interval between link checks while serving (seconds).
    pub link_check_secs: u32,
    /// TCP port of the status interface.
    pub http_port: u16,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            measure_every_ticks: 5,
            watchdog_timeout_ms: 8388,
            connect_attempts: 4,
            status_polls: 10,
            poll_half_period_ms: 250,
            link_check_secs: 30,
            http_port: 80,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Core system configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub control: ControlConfig,
    pub network: NetworkConfig,
    pub calibrations: heapless::Vec<SensorCalibration, MAX_CALIBRATIONS>,
    pub timing: TimingConfig,
}

impl SystemConfig {
    /// Parse the public config document and the secrets document.
    ///
    /// Layout of `config`:
    ///
    /// ```json
    /// {
    ///   "Wi-Fi Country": "CH",
    ///   "Hostname": "dewfan",
    ///   "DewPointFanController": {
    ///     "switch-min": {"value": 5.0},
    ///     "hysteresis": {"value": 1.0},
    ///     "temp-indoor-min": {"value": 10.0},
    ///     "temp-outdoor-min": {"value": -10.0}
    ///   },
    ///   "sensors": [{"name": "indoor", "offset-temp": 0.0, "offset-hum": 0.0}]
    /// }
    /// ```
    ///
    /// `secrets` holds `{"wlans": [{"ssid": "...", "password": "..."}]}`.
    /// Missing optional keys fall back to the defaults.
    pub fn from_json(config: &str, secrets: &str) -> Result<Self, Error> {
        let doc: json::ConfigDoc =
            serde_json::from_str(config).map_err(|_| Error::Config("config document malformed"))?;
        let sec: json::SecretsDoc =
            serde_json::from_str(secrets).map_err(|_| Error::Config("secrets document malformed"))?;

        let mut cfg = SystemConfig::default();
        cfg.control = ControlConfig {
            switch_min: doc.controller.switch_min.value,
            hysteresis: doc.controller.hysteresis.value,
            temp_indoor_min: doc.controller.temp_indoor_min.value,
            temp_outdoor_min: doc.controller.temp_outdoor_min.value,
        };
        if let Some(country) = doc.country {
            cfg.network.country = country;
        }
        if let Some(hostname) = doc.hostname {
            cfg.network.hostname = hostname;
        }
        if let Some(ntp) = doc.ntp_host {
            cfg.network.ntp_host = ntp;
        }
        for s in doc.sensors {
            cfg.calibrations
                .push(SensorCalibration {
                    sensor: s.name,
                    offset_temp: s.offset_temp,
                    offset_hum: s.offset_hum,
                })
                .map_err(|_| Error::Config("too many sensor calibrations"))?;
        }
        for w in sec.wlans {
            cfg.network
                .known_networks
                .push(KnownNetwork { ssid: w.ssid, password: w.password })
                .map_err(|_| Error::Config("too many known networks"))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make the controller misbehave.
    pub fn validate(&self) -> Result<(), Error> {
        let c = &self.control;
        let all_finite = [c.switch_min, c.hysteresis, c.temp_indoor_min, c.temp_outdoor_min]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::Config("control thresholds must be finite"));
        }
        if c.hysteresis < 0.0 {
            return Err(Error::Config("hysteresis must not be negative"));
        }
        for net in &self.network.known_networks {
            validate_ssid(&net.ssid)?;
            validate_password(&net.password)?;
        }
        if self.network.hostname.is_empty() {
            return Err(Error::Config("hostname must not be empty"));
        }
        let t = &self.timing;
        if t.tick_ms == 0 || t.measure_every_ticks == 0 || t.connect_attempts == 0 {
            return Err(Error::Config("timing values must be non-zero"));
        }
        if t.watchdog_timeout_ms <= t.tick_ms {
            return Err(Error::Config("watchdog timeout must exceed the tick period"));
        }
        Ok(())
    }

    /// Calibration offsets for `sensor`, or zero offsets if none configured.
    pub fn calibration_for(&self, sensor: &str) -> SensorCalibration {
        self.calibrations
            .iter()
            .find(|c| c.sensor.as_str() == sensor)
            .cloned()
            .unwrap_or_else(|| SensorCalibration {
                sensor: str_field(sensor),
                offset_temp: 0.0,
                offset_hum: 0.0,
            })
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), Error> {
    if ssid.is_empty() || !is_printable_ascii(ssid) {
        return Err(Error::Config("SSID invalid (must be 1-32 printable ASCII bytes)"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), Error> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 {
        return Err(Error::Config(
            "password invalid (must be 8-64 bytes for WPA2, or empty for open)",
        ));
    }
    Ok(())
}

/// Truncating conversion for defaults and fallbacks.
fn str_field<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// On-disk JSON layout
// ---------------------------------------------------------------------------

mod json {
    use heapless::String;
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub struct Valued {
        pub value: f32,
    }

    #[derive(Deserialize)]
    pub struct Controller {
        #[serde(rename = "switch-min")]
        pub switch_min: Valued,
        pub hysteresis: Valued,
        #[serde(rename = "temp-indoor-min")]
        pub temp_indoor_min: Valued,
        #[serde(rename = "temp-outdoor-min")]
        pub temp_outdoor_min: Valued,
    }

    #[derive(Deserialize)]
    pub struct SensorEntry {
        pub name: String<16>,
        #[serde(rename = "offset-temp", default)]
        pub offset_temp: f32,
        #[serde(rename = "offset-hum", default)]
        pub offset_hum: f32,
    }

    #[derive(Deserialize)]
    pub struct ConfigDoc {
        #[serde(rename = "Wi-Fi Country")]
        pub country: Option<String<2>>,
        #[serde(rename = "Hostname")]
        pub hostname: Option<String<32>>,
        #[serde(rename = "NTP Host")]
        pub ntp_host: Option<String<64>>,
        #[serde(rename = "DewPointFanController")]
        pub controller: Controller,
        #[serde(default)]
        pub sensors: Vec<SensorEntry>,
    }

    #[derive(Deserialize)]
    pub struct Wlan {
        pub ssid: String<32>,
        #[serde(default)]
        pub password: String<64>,
    }

    #[derive(Deserialize)]
    pub struct SecretsDoc {
        #[serde(default)]
        pub wlans: Vec<Wlan>,
    }
}
