//! Wi-Fi connection manager.
//!
//! Bounded connect/retry state machine in station mode.  Runs once at
//! startup and again whenever the status server notices the link is gone;
//! it never touches the measurement cycle.
//!
//! ```text
//!  Disconnected ──▶ Scanning ──▶ Connecting ──▶ Connected
//!        ▲              │             │
//!        └──── attempt failure ◀──────┘   (× attempt budget) ──▶ Failed
//! ```
//!
//! A missing SSID and a rejected credential are retried the same way.

use core::fmt;
use std::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use heapless::String;
use log::{info, warn};

use crate::app::ports::{ClockPort, StatusIndicator, WifiPort};
use crate::config::{KnownNetwork, NetworkConfig, TimingConfig};
use crate::error::NetworkError;

// ───────────────────────────────────────────────────────────────
// Link status reported by the radio
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Idle,
    Connecting,
    NoIp,
    GotIp,
    ConnectFail,
    NoApFound,
    WrongPassword,
}

impl LinkStatus {
    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "no connection and no activity",
            Self::Connecting => "connecting in progress",
            Self::NoIp => "connected to wifi, but no IP address",
            Self::GotIp => "connection successful",
            Self::ConnectFail => "failed due to other problems",
            Self::NoApFound => "failed because no access point replied",
            Self::WrongPassword => "failed due to incorrect password",
        }
    }

    /// Still negotiating; keep polling.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Connecting | Self::NoIp)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

// ───────────────────────────────────────────────────────────────
// Manager state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Scanning,
    Connecting,
    Connected,
    Failed,
}

/// One entry of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub ssid: String<32>,
    pub rssi: i8,
}

/// Addresses assigned by DHCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetInfo {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub dns: Ipv4Addr,
}

impl fmt::Display for NetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ip={} netmask={} gateway={} dns={}",
            self.ip, self.netmask, self.gateway, self.dns
        )
    }
}

/// First scan result (in scan order) that appears in the known list.
pub fn select_network<'a>(
    scan: &[ScanResult],
    known: &'a [KnownNetwork],
) -> Option<&'a KnownNetwork> {
    scan.iter()
        .find_map(|seen| known.iter().find(|k| k.ssid.as_str() == seen.ssid.as_str()))
}

// ───────────────────────────────────────────────────────────────
// NetworkManager
// ───────────────────────────────────────────────────────────────

pub struct NetworkManager<W, C> {
    wifi: W,
    clock: C,
    config: NetworkConfig,
    attempts: u8,
    status_polls: u8,
    poll_half_period_ms: u32,

    state: ConnectionState,
    retry_count: u8,
    matched_ssid: Option<String<32>>,
    last_status: LinkStatus,
    net_info: Option<NetInfo>,
    clock_synced: bool,
}

impl<W: WifiPort, C: ClockPort> NetworkManager<W, C> {
    pub fn new(wifi: W, clock: C, config: &NetworkConfig, timing: &TimingConfig) -> Self {
        Self {
            wifi,
            clock,
            config: config.clone(),
            attempts: timing.connect_attempts,
            status_polls: timing.status_polls,
            poll_half_period_ms: timing.poll_half_period_ms,
            state: ConnectionState::Disconnected,
            retry_count: 0,
            matched_ssid: None,
            last_status: LinkStatus::Idle,
            net_info: None,
            clock_synced: false,
        }
    }

    /// Bring the link up, spending at most the configured attempt budget.
    pub fn start(
        &mut self,
        indicator: &mut impl StatusIndicator,
        delay: &mut impl DelayNs,
    ) -> ConnectionState {
        self.retry_count = 0;

        for attempt in 1..=self.attempts {
            match self.attempt(indicator, delay) {
                Ok(()) => return self.state,
                Err(e) => {
                    warn!("Wi-Fi attempt {}/{} failed: {}", attempt, self.attempts, e);
                    self.retry_count = attempt;
                    self.state = ConnectionState::Disconnected;
                }
            }
        }

        warn!("Wi-Fi: giving up after {} attempts, local operation only", self.attempts);
        self.state = ConnectionState::Failed;
        self.state
    }

    /// Detect a dropped link.  Only meaningful once connected.
    pub fn check_link(&mut self) -> ConnectionState {
        if self.state == ConnectionState::Connected && !self.wifi.is_connected() {
            self.last_status = self.wifi.status();
            warn!("Wi-Fi: link lost ({})", self.last_status);
            self.state = ConnectionState::Disconnected;
            self.net_info = None;
            self.matched_ssid = None;
        }
        self.state
    }

    /// Run [`start`](Self::start) again with a fresh attempt budget.
    pub fn reconnect(
        &mut self,
        indicator: &mut impl StatusIndicator,
        delay: &mut impl DelayNs,
    ) -> ConnectionState {
        info!("Wi-Fi: reconnecting");
        self.start(indicator, delay)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Failed attempts during the last `start`.
    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }

    pub fn matched_ssid(&self) -> Option<&str> {
        self.matched_ssid.as_ref().map(|s| s.as_str())
    }

    pub fn last_status(&self) -> LinkStatus {
        self.last_status
    }

    pub fn net_info(&self) -> Option<NetInfo> {
        self.net_info
    }

    pub fn clock_synced(&self) -> bool {
        self.clock_synced
    }

    pub fn wifi(&self) -> &W {
        &self.wifi
    }

    // ── Internal ──────────────────────────────────────────────

    fn attempt(
        &mut self,
        indicator: &mut impl StatusIndicator,
        delay: &mut impl DelayNs,
    ) -> Result<(), NetworkError> {
        if !self.wifi.is_connected() {
            self.matched_ssid = None;
            indicator.set(false);
            self.wifi.reset()?;
            if self.wifi.mac()? == [0u8; 6] {
                return Err(NetworkError::InvalidMac);
            }
            self.wifi.disable_power_save()?;

            self.state = ConnectionState::Scanning;
            let visible = self.wifi.scan()?;
            let known = select_network(&visible, &self.config.known_networks)
                .ok_or(NetworkError::NoKnownNetwork)?;
            info!("Wi-Fi: found known network '{}'", known.ssid);
            self.matched_ssid = Some(known.ssid.clone());

            self.state = ConnectionState::Connecting;
            self.wifi.connect(&known.ssid, &known.password)?;
            self.last_status = self.poll_status(indicator, delay);

            if !self.wifi.is_connected() {
                return Err(NetworkError::ConnectFailed(self.last_status));
            }
        }

        self.on_connected(indicator);
        Ok(())
    }

    fn poll_status(
        &mut self,
        indicator: &mut impl StatusIndicator,
        delay: &mut impl DelayNs,
    ) -> LinkStatus {
        let mut status = LinkStatus::Connecting;
        for _ in 0..self.status_polls {
            status = self.wifi.status();
            if !status.is_pending() {
                break;
            }
            indicator.toggle();
            delay.delay_ms(self.poll_half_period_ms);
            indicator.toggle();
            delay.delay_ms(self.poll_half_period_ms);
        }
        status
    }

    fn on_connected(&mut self, indicator: &mut impl StatusIndicator) {
        indicator.set(true);
        self.last_status = LinkStatus::GotIp;
        self.net_info = self.wifi.net_info();
        match &self.net_info {
            Some(info) => info!("Wi-Fi: connected, {}", info),
            None => info!("Wi-Fi: connected"),
        }

        match self.clock.sync(&self.config.ntp_host) {
            Ok(()) => {
                self.clock_synced = true;
                info!("Clock synchronised from {}", self.config.ntp_host);
            }
            Err(e) => {
                self.clock_synced = false;
                warn!("Clock sync from {} failed: {}", self.config.ntp_host, e);
            }
        }

        self.state = ConnectionState::Connected;
    }
}
