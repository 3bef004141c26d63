//! Mock hardware adapters for integration tests.
//!
//! Shared state lives behind `Arc`/atomics so a mock can move into a
//! control thread while the test keeps a handle for assertions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dewfan::app::events::AppEvent;
use dewfan::app::ports::{
    ClimateReading, ClimateSensor, ClockPort, EventSink, FanOutput, StatusIndicator, WifiPort,
};
use dewfan::error::{NetworkError, SensorError};
use dewfan::network::{LinkStatus, NetInfo, ScanResult};
use embedded_hal::delay::DelayNs;

// ── Sensors ───────────────────────────────────────────────────

/// Replays a fixed script; `NoResponse` once it runs dry.
pub struct ScriptedSensor {
    name: &'static str,
    readings: VecDeque<Result<ClimateReading, SensorError>>,
}

impl ScriptedSensor {
    pub fn new(name: &'static str, items: &[Result<(f32, f32), SensorError>]) -> Self {
        Self {
            name,
            readings: items
                .iter()
                .map(|r| r.map(|(temperature, humidity)| ClimateReading { temperature, humidity }))
                .collect(),
        }
    }
}

impl ClimateSensor for ScriptedSensor {
    fn name(&self) -> &str {
        self.name
    }

    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        self.readings.pop_front().unwrap_or(Err(SensorError::NoResponse))
    }
}

/// Temperature rises by one degree per reading; each reading takes `delay`.
///
/// The n-th successful reading reports `base + n - 1`, so any snapshot can
/// be checked against its own counter.
pub struct SequenceSensor {
    base: f32,
    humidity: f32,
    delay: Duration,
    calls: u32,
}

impl SequenceSensor {
    pub fn new(base: f32, humidity: f32, delay: Duration) -> Self {
        Self { base, humidity, delay, calls: 0 }
    }
}

impl ClimateSensor for SequenceSensor {
    fn name(&self) -> &str {
        "sequence"
    }

    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        std::thread::sleep(self.delay);
        let reading = ClimateReading {
            temperature: self.base + self.calls as f32,
            humidity: self.humidity,
        };
        self.calls += 1;
        Ok(reading)
    }
}

// ── Fan ───────────────────────────────────────────────────────

/// Relay whose feedback input follows the output unless `stalled`.
#[derive(Clone, Default)]
pub struct MockFan {
    pub on: Arc<AtomicBool>,
    pub stalled: Arc<AtomicBool>,
    pub writes: Arc<AtomicUsize>,
}

impl FanOutput for MockFan {
    fn set_fan(&mut self, on: bool) {
        self.on.store(on, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn fan_running(&mut self) -> bool {
        self.on.load(Ordering::SeqCst) && !self.stalled.load(Ordering::SeqCst)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<AppEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn all(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn switches(&self) -> usize {
        self.all()
            .iter()
            .filter(|e| matches!(e, AppEvent::FanSwitched { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ── Network ───────────────────────────────────────────────────

/// Radio that sees `visible`, accepts `accepts` and reports `GotIp` after
/// `polls_to_connect` status polls.
pub struct MockWifi {
    pub mac: [u8; 6],
    pub visible: Vec<&'static str>,
    pub accepts: Option<&'static str>,
    pub polls_to_connect: u32,
    pub resets: Arc<AtomicU32>,
    pub status_polls: Arc<AtomicU32>,
    pub link_up: Arc<AtomicBool>,
    connecting_to: Option<String>,
    polls: u32,
}

impl MockWifi {
    pub fn new(visible: &[&'static str], accepts: Option<&'static str>) -> Self {
        Self {
            mac: [0x02, 0, 0, 0xDE, 0xF0, 0x01],
            visible: visible.to_vec(),
            accepts,
            polls_to_connect: 2,
            resets: Arc::default(),
            status_polls: Arc::default(),
            link_up: Arc::default(),
            connecting_to: None,
            polls: 0,
        }
    }
}

impl WifiPort for MockWifi {
    fn reset(&mut self) -> Result<(), NetworkError> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        self.link_up.store(false, Ordering::SeqCst);
        self.connecting_to = None;
        Ok(())
    }

    fn mac(&mut self) -> Result<[u8; 6], NetworkError> {
        Ok(self.mac)
    }

    fn disable_power_save(&mut self) -> Result<(), NetworkError> {
        Ok(())
    }

    fn scan(&mut self) -> Result<Vec<ScanResult>, NetworkError> {
        Ok(self
            .visible
            .iter()
            .map(|s| ScanResult { ssid: heapless::String::try_from(*s).unwrap(), rssi: -60 })
            .collect())
    }

    fn connect(&mut self, ssid: &str, _password: &str) -> Result<(), NetworkError> {
        self.connecting_to = Some(ssid.to_owned());
        self.polls = 0;
        Ok(())
    }

    fn status(&mut self) -> LinkStatus {
        self.status_polls.fetch_add(1, Ordering::SeqCst);
        self.polls += 1;
        match (&self.connecting_to, self.accepts) {
            (Some(ssid), Some(ok)) if ssid == ok => {
                if self.polls >= self.polls_to_connect {
                    self.link_up.store(true, Ordering::SeqCst);
                    LinkStatus::GotIp
                } else {
                    LinkStatus::Connecting
                }
            }
            (Some(_), _) => LinkStatus::WrongPassword,
            (None, _) => LinkStatus::Idle,
        }
    }

    fn is_connected(&mut self) -> bool {
        self.link_up.load(Ordering::SeqCst)
    }

    fn net_info(&mut self) -> Option<NetInfo> {
        self.is_connected().then(|| NetInfo {
            ip: [192, 168, 1, 50].into(),
            netmask: [255, 255, 255, 0].into(),
            gateway: [192, 168, 1, 1].into(),
            dns: [192, 168, 1, 1].into(),
        })
    }
}

#[derive(Default)]
pub struct MockClock {
    pub syncs: Vec<String>,
}

impl ClockPort for MockClock {
    fn sync(&mut self, host: &str) -> Result<(), NetworkError> {
        self.syncs.push(host.to_owned());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockLed {
    pub on: bool,
    pub toggles: u32,
}

impl StatusIndicator for MockLed {
    fn set(&mut self, on: bool) {
        self.on = on;
    }

    fn toggle(&mut self) {
        self.on = !self.on;
        self.toggles += 1;
    }
}

/// Records requested delay instead of sleeping.
#[derive(Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
