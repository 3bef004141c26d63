//! NetworkManager against a scripted radio.

use std::sync::atomic::Ordering;
use std::time::Duration;

use dewfan::config::{KnownNetwork, NetworkConfig, TimingConfig};
use dewfan::network::{ConnectionState, LinkStatus, NetworkManager};
use dewfan::report::server::LinkSupervisor;

use super::mock_hw::{CountingDelay, MockClock, MockLed, MockWifi};

fn config(known: &[&str]) -> NetworkConfig {
    let mut cfg = NetworkConfig::default();
    for ssid in known {
        cfg.known_networks
            .push(KnownNetwork {
                ssid: heapless::String::try_from(*ssid).unwrap(),
                password: heapless::String::try_from("secret-pass").unwrap(),
            })
            .unwrap();
    }
    cfg
}

#[test]
fn connects_to_first_visible_known_network() {
    let wifi = MockWifi::new(&["Cafe", "Attic", "Home"], Some("Attic"));
    let mut net = NetworkManager::new(
        wifi,
        MockClock::default(),
        &config(&["Home", "Attic"]),
        &TimingConfig::default(),
    );
    let mut led = MockLed::default();
    let mut delay = CountingDelay::default();

    assert_eq!(net.start(&mut led, &mut delay), ConnectionState::Connected);
    assert_eq!(net.matched_ssid(), Some("Attic"));
    assert_eq!(net.retry_count(), 0);
    assert_eq!(net.last_status(), LinkStatus::GotIp);
    assert!(net.clock_synced());
    assert!(led.on);
    assert_eq!(net.net_info().map(|i| i.ip), Some([192, 168, 1, 50].into()));
}

#[test]
fn exhausts_attempt_budget() {
    let wifi = MockWifi::new(&["Home"], None);
    let resets = wifi.resets.clone();
    let polls = wifi.status_polls.clone();
    let timing = TimingConfig::default();
    let mut net = NetworkManager::new(wifi, MockClock::default(), &config(&["Home"]), &timing);
    let mut led = MockLed::default();
    let mut delay = CountingDelay::default();

    assert_eq!(net.start(&mut led, &mut delay), ConnectionState::Failed);
    assert_eq!(net.retry_count(), timing.connect_attempts);
    assert_eq!(resets.load(Ordering::SeqCst), u32::from(timing.connect_attempts));
    // A rejected password ends each attempt on its first poll.
    assert_eq!(polls.load(Ordering::SeqCst), u32::from(timing.connect_attempts));
    assert_eq!(net.last_status(), LinkStatus::WrongPassword);
    assert!(!led.on);
}

#[test]
fn slow_association_blinks_indicator() {
    let mut wifi = MockWifi::new(&["Home"], Some("Home"));
    wifi.polls_to_connect = 4;
    let timing = TimingConfig::default();
    let mut net = NetworkManager::new(wifi, MockClock::default(), &config(&["Home"]), &timing);
    let mut led = MockLed::default();
    let mut delay = CountingDelay::default();

    assert_eq!(net.start(&mut led, &mut delay), ConnectionState::Connected);
    // Three pending polls, each a full on/off blink.
    assert_eq!(led.toggles, 6);
    assert_eq!(delay.total_ns, 6 * u64::from(timing.poll_half_period_ms) * 1_000_000);
}

#[test]
fn supervisor_restores_dropped_link() {
    let wifi = MockWifi::new(&["Home"], Some("Home"));
    let link = wifi.link_up.clone();
    let mut net = NetworkManager::new(
        wifi,
        MockClock::default(),
        &config(&["Home"]),
        &TimingConfig::default(),
    );
    let mut led = MockLed::default();
    let mut delay = CountingDelay::default();
    net.start(&mut led, &mut delay);

    let mut sup = LinkSupervisor {
        network: net,
        indicator: led,
        delay,
        interval: Duration::from_secs(30),
    };
    assert_eq!(sup.check(), ConnectionState::Connected);

    link.store(false, Ordering::SeqCst);
    assert_eq!(sup.check(), ConnectionState::Connected);
    assert!(link.load(Ordering::SeqCst));
    assert_eq!(sup.network.wifi().resets.load(Ordering::SeqCst), 2);
}

#[test]
fn supervisor_retries_after_failed_start() {
    let wifi = MockWifi::new(&[], Some("Home"));
    let mut net = NetworkManager::new(
        wifi,
        MockClock::default(),
        &config(&["Home"]),
        &TimingConfig::default(),
    );
    let mut led = MockLed::default();
    let mut delay = CountingDelay::default();
    assert_eq!(net.start(&mut led, &mut delay), ConnectionState::Failed);

    let mut sup = LinkSupervisor {
        network: net,
        indicator: led,
        delay,
        interval: Duration::from_secs(30),
    };
    assert_eq!(sup.check(), ConnectionState::Failed);
}
