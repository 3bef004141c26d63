//! Status interface tests: rendering from a live engine and serving over
//! an in-memory connection.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use dewfan::app::engine::ControlEngine;
use dewfan::config::{ControlConfig, KnownNetwork, NetworkConfig, TimingConfig};
use dewfan::network::{ConnectionState, NetworkManager};
use dewfan::report::server::{serve_client, spawn_if_connected, LinkSupervisor};
use dewfan::report::{ReportRenderer, Route};

use super::mock_hw::{
    CountingDelay, MockClock, MockFan, MockLed, MockWifi, RecordingSink, ScriptedSensor,
};

/// Sample lines of an exposition body, keyed by metric name without labels.
pub struct Metrics(HashMap<String, String>);

impl Metrics {
    pub fn get<T: FromStr>(&self, name: &str) -> T
    where
        T::Err: std::fmt::Debug,
    {
        self.0
            .get(name)
            .unwrap_or_else(|| panic!("metric {name} missing"))
            .parse()
            .unwrap()
    }

    pub fn raw(&self, name: &str) -> &str {
        &self.0[name]
    }
}

pub fn parse_metrics(body: &str) -> Metrics {
    Metrics(
        body.lines()
            .filter(|l| !l.starts_with('#') && !l.is_empty())
            .map(|l| {
                let (series, value) = l.rsplit_once(' ').unwrap();
                let name = series.split('{').next().unwrap();
                (name.to_owned(), value.to_owned())
            })
            .collect(),
    )
}

fn engine_after_one_cycle() -> ControlEngine<ScriptedSensor, ScriptedSensor, MockFan> {
    let mut sink = RecordingSink::default();
    let mut engine = ControlEngine::new(
        ControlConfig::default(),
        ScriptedSensor::new("indoor", &[Ok((21.3, 64.9))]),
        ScriptedSensor::new("outdoor", &[Ok((-3.7, 81.2))]),
        MockFan::default(),
    );
    engine.start(&mut sink);
    engine.measure_and_decide("17.10.2026 08:15:00", &mut sink).unwrap();
    engine
}

#[test]
fn metrics_parse_back_to_stored_values() {
    let engine = engine_after_one_cycle();
    let snap = engine.snapshot_handle().snapshot();
    let m = parse_metrics(&ReportRenderer::new(engine.snapshot_handle()).render_metrics());

    let s = snap.measurement.sample;
    assert_eq!(m.get::<f32>("indoor_temp"), s.indoor_temp);
    assert_eq!(m.get::<f32>("indoor_hum"), s.indoor_hum);
    assert_eq!(m.get::<f32>("indoor_dew_point"), s.indoor_dew_point);
    assert_eq!(m.get::<f32>("outdoor_temp"), s.outdoor_temp);
    assert_eq!(m.get::<f32>("outdoor_hum"), s.outdoor_hum);
    assert_eq!(m.get::<f32>("outdoor_dew_point"), s.outdoor_dew_point);
    assert_eq!(m.get::<u32>("measurement_count"), 1);
    assert_eq!(m.get::<u64>("measure_control_duration"), snap.cycle_duration_us);
    assert_eq!(m.raw("fan_control"), if snap.fan.commanded { "1" } else { "0" });
    assert_eq!(m.raw("fan_state"), if snap.fan.sensed { "1" } else { "0" });
}

#[test]
fn page_served_over_connection() {
    let engine = engine_after_one_cycle();
    let renderer = ReportRenderer::new(engine.snapshot_handle());
    let mut out = Vec::new();

    let route = futures_lite::future::block_on(serve_client(
        &b"GET / HTTP/1.1\r\nHost: dewfan\r\nUser-Agent: test\r\n\r\n"[..],
        &mut out,
        &renderer,
    ))
    .unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(route, Route::Page);
    assert!(text.starts_with("HTTP/1.0 200 OK\r\nContent-type: text/html\r\n\r\n"));
    assert!(text.contains("17.10.2026 08:15:00"));
    assert!(text.contains("out: -3.7&#176;C, 81.2%"));
    assert!(text.contains("in:  21.3&#176;C, 64.9%"));
}

#[test]
fn metrics_route_only_at_request_target() {
    let engine = engine_after_one_cycle();
    let renderer = ReportRenderer::new(engine.snapshot_handle());
    let serve = |req: &'static [u8]| {
        let mut out = Vec::new();
        futures_lite::future::block_on(serve_client(req, &mut out, &renderer)).unwrap()
    };

    assert_eq!(serve(b"GET /metrics HTTP/1.1\r\n\r\n"), Route::Metrics);
    assert_eq!(serve(b"GET /metricsXYZ HTTP/1.1\r\n\r\n"), Route::Metrics);
    assert_eq!(serve(b"GET /status?x=/metrics HTTP/1.1\r\n\r\n"), Route::Page);
    assert_eq!(serve(b"POST /metrics HTTP/1.1\r\n\r\n"), Route::Page);
}

fn supervisor(
    wifi: MockWifi,
    known: &[&str],
) -> LinkSupervisor<MockWifi, MockClock, MockLed, CountingDelay> {
    let mut cfg = NetworkConfig::default();
    for ssid in known {
        cfg.known_networks
            .push(KnownNetwork {
                ssid: heapless::String::try_from(*ssid).unwrap(),
                password: heapless::String::try_from("secret-pass").unwrap(),
            })
            .unwrap();
    }
    let timing = TimingConfig::default();
    let mut network = NetworkManager::new(wifi, MockClock::default(), &cfg, &timing);
    let mut led = MockLed::default();
    let mut delay = CountingDelay::default();
    network.start(&mut led, &mut delay);
    LinkSupervisor { network, indicator: led, delay, interval: Duration::from_secs(30) }
}

#[test]
fn server_not_started_without_network() {
    let engine = engine_after_one_cycle();
    let sup = supervisor(MockWifi::new(&["Neighbour"], None), &["Home"]);
    assert_eq!(sup.network.state(), ConnectionState::Failed);

    let started = spawn_if_connected(0, ReportRenderer::new(engine.snapshot_handle()), sup);
    assert!(started.is_none());

    // Control carries on regardless.
    assert_eq!(engine.snapshot_handle().snapshot().measurement.counter, 1);
}

#[test]
fn server_started_when_connected() {
    let engine = engine_after_one_cycle();
    let sup = supervisor(MockWifi::new(&["Home"], Some("Home")), &["Home"]);
    assert_eq!(sup.network.state(), ConnectionState::Connected);

    let started = spawn_if_connected(0, ReportRenderer::new(engine.snapshot_handle()), sup);
    assert!(matches!(started, Some(Ok(_))));
}
