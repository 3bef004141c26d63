//! Dew Point Fan Controller — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Dht22 ×2          FanRelay       LogEventSink   SntpClock     │
//! │  (ClimateSensor)   (FanOutput)    (EventSink)    (ClockPort)   │
//! │  EspWifiLink       StatusLed                                   │
//! │  (WifiPort)        (StatusIndicator)                           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐   │
//! │  │ ControlEngine            │   │ NetworkManager           │   │
//! │  │ FSM · dew point · store  │   │ scan · connect · SNTP    │   │
//! │  └──────────────────────────┘   └──────────────────────────┘   │
//! │                                                                │
//! │  main loop (1 Hz tick, watchdog)   http thread (status server) │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver, Pull};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use dewfan::adapters::device_id;
use dewfan::adapters::log_sink::LogEventSink;
use dewfan::adapters::time::{local_timestamp, SntpClock};
use dewfan::adapters::wifi::EspWifiLink;
use dewfan::app::engine::ControlEngine;
use dewfan::app::ports::StatusIndicator;
use dewfan::config::SystemConfig;
use dewfan::drivers::fan::FanRelay;
use dewfan::drivers::hw_timer::{self, TickGate};
use dewfan::drivers::status_led::StatusLed;
use dewfan::drivers::watchdog::Watchdog;
use dewfan::events::{wait_event, Event};
use dewfan::network::NetworkManager;
use dewfan::pins;
use dewfan::report::server::{self, LinkSupervisor};
use dewfan::report::ReportRenderer;
use dewfan::sensors::dht22::Dht22;
use dewfan::sensors::CalibratedSensor;

const SNTP_TIMEOUT_MS: u32 = 10_000;

fn load_config(mac: &device_id::MacAddress) -> SystemConfig {
    match SystemConfig::from_json(
        include_str!("../config/config.json"),
        include_str!("../config/secrets.json"),
    ) {
        Ok(cfg) => {
            info!("Config loaded ({} known networks)", cfg.network.known_networks.len());
            cfg
        }
        Err(e) => {
            warn!("Config rejected ({}), using defaults", e);
            let mut cfg = SystemConfig::default();
            cfg.network.hostname = device_id::default_hostname(mac);
            cfg
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Dew Point Fan Controller v{}     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let mac = device_id::read_mac();
    info!("Device ID: {} (MAC {})", device_id::device_id(&mac), device_id::format_mac(&mac));

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config(&mac);

    // ── 3. Pins ───────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();

    // SAFETY: every GPIO number in `pins` is distinct and none of them is
    // taken from `peripherals.pins`.
    let (indoor_pin, outdoor_pin, relay, fan_led, fan_status, wlan_led, onboard_led) = unsafe {
        (
            AnyIOPin::new(pins::INDOOR_DHT_GPIO),
            AnyIOPin::new(pins::OUTDOOR_DHT_GPIO),
            AnyOutputPin::new(pins::FAN_RELAY_GPIO),
            AnyOutputPin::new(pins::FAN_LED_GPIO),
            AnyInputPin::new(pins::FAN_STATUS_GPIO),
            AnyOutputPin::new(pins::WLAN_LED_GPIO),
            AnyOutputPin::new(pins::ONBOARD_LED_GPIO),
        )
    };

    let mut indoor_pin = PinDriver::input_output_od(indoor_pin)?;
    indoor_pin.set_pull(Pull::Up)?;
    let mut outdoor_pin = PinDriver::input_output_od(outdoor_pin)?;
    outdoor_pin.set_pull(Pull::Up)?;

    let mut wlan_led = StatusLed::new(PinDriver::output(wlan_led)?);
    let mut heartbeat = StatusLed::new(PinDriver::output(onboard_led)?);

    // ── 4. Network (before the watchdog: association can be slow) ──
    let wifi = EspWifiLink::new(
        peripherals.modem,
        sysloop,
        nvs,
        &config.network.country,
        &config.network.hostname,
    )
    .map_err(dewfan::error::Error::from)?;
    let mut network = NetworkManager::new(
        wifi,
        SntpClock::new(SNTP_TIMEOUT_MS),
        &config.network,
        &config.timing,
    );
    let net_state = network.start(&mut wlan_led, &mut FreeRtos);
    info!(
        "Network: {:?} (failed attempts={}, ssid={:?})",
        net_state,
        network.retry_count(),
        network.matched_ssid()
    );

    // ── 5. Control engine ─────────────────────────────────────
    let indoor = CalibratedSensor::new(
        Dht22::new("indoor", indoor_pin, Ets),
        &config.calibration_for("indoor"),
    );
    let outdoor = CalibratedSensor::new(
        Dht22::new("outdoor", outdoor_pin, Ets),
        &config.calibration_for("outdoor"),
    );
    let fan = FanRelay::new(
        PinDriver::output(relay)?,
        PinDriver::output(fan_led)?,
        PinDriver::input(fan_status)?,
    );

    let mut sink = LogEventSink::new();
    let mut engine = ControlEngine::new(config.control, indoor, outdoor, fan);
    engine.start(&mut sink);
    // Failures are reported through the sink; the next gated tick retries.
    let _ = engine.measure_and_decide(&local_timestamp(), &mut sink);

    // ── 6. Status interface ───────────────────────────────────
    let supervisor = LinkSupervisor {
        network,
        indicator: wlan_led,
        delay: FreeRtos,
        interval: Duration::from_secs(u64::from(config.timing.link_check_secs)),
    };
    let renderer = ReportRenderer::new(engine.snapshot_handle());
    let port = config.timing.http_port;
    if let Some(Err(e)) = server::spawn_if_connected(port, renderer, supervisor) {
        error!("HTTP: server not started: {}", e);
    }

    // ── 7. Control loop ───────────────────────────────────────
    let watchdog = Watchdog::new(config.timing.watchdog_timeout_ms);
    hw_timer::start(config.timing.tick_ms)?;
    let mut gate = TickGate::new(config.timing.measure_every_ticks);

    info!("System ready. Entering control loop.");

    loop {
        match wait_event() {
            Event::Tick => {
                heartbeat.toggle();
                if gate.tick() {
                    let _ = engine.measure_and_decide(&local_timestamp(), &mut sink);
                }
                watchdog.feed();
            }
        }
    }
}
