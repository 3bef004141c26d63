//! Wi-Fi station-mode adapter.
//!
//! Implements [`WifiPort`] over `esp_idf_svc::wifi::EspWifi` on the
//! device.  Host builds only get the address helpers; tests drive the
//! [`NetworkManager`](crate::network::NetworkManager) through mocks.
//!
//! ## Link status
//!
//! ESP-IDF does not expose a single status register, so the adapter
//! derives [`LinkStatus`](crate::network::LinkStatus) from what it can see:
//!
//! | netif up | associated | connect pending | status      |
//! |----------|------------|-----------------|-------------|
//! | yes      | -          | -               | GotIp       |
//! | no       | yes        | -               | NoIp        |
//! | no       | no         | < timeout       | Connecting  |
//! | no       | no         | expired         | ConnectFail |
//! | no       | no         | none            | Idle        |

use std::net::Ipv4Addr;

/// Netmask from a CIDR prefix length.
pub fn prefix_to_netmask(prefix: u8) -> Ipv4Addr {
    match prefix {
        0 => Ipv4Addr::UNSPECIFIED,
        p if p >= 32 => Ipv4Addr::BROADCAST,
        p => Ipv4Addr::from(u32::MAX << (32 - u32::from(p))),
    }
}

#[cfg(target_os = "espidf")]
pub use device::EspWifiLink;

#[cfg(target_os = "espidf")]
mod device {
    use std::ffi::CString;
    use std::time::{Duration, Instant};

    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use super::prefix_to_netmask;
    use crate::app::ports::WifiPort;
    use crate::error::NetworkError;
    use crate::network::{LinkStatus, NetInfo, ScanResult};

    /// Give up on a pending association after this long.
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

    pub struct EspWifiLink {
        wifi: EspWifi<'static>,
        country: CString,
        hostname: heapless::String<32>,
        connect_started: Option<Instant>,
    }

    fn driver(e: esp_idf_svc::sys::EspError) -> NetworkError {
        warn!("Wi-Fi driver: {}", e);
        NetworkError::Driver
    }

    impl EspWifiLink {
        pub fn new(
            modem: Modem,
            sysloop: EspSystemEventLoop,
            nvs: Option<EspDefaultNvsPartition>,
            country: &str,
            hostname: &str,
        ) -> Result<Self, NetworkError> {
            let wifi = EspWifi::new(modem, sysloop, nvs).map_err(driver)?;
            let country = CString::new(country).map_err(|_| NetworkError::Driver)?;
            let hostname = heapless::String::try_from(hostname).map_err(|_| NetworkError::Driver)?;
            Ok(Self { wifi, country, hostname, connect_started: None })
        }
    }

    impl WifiPort for EspWifiLink {
        fn reset(&mut self) -> Result<(), NetworkError> {
            self.connect_started = None;
            if self.wifi.is_started().map_err(driver)? {
                let _ = self.wifi.disconnect();
                self.wifi.stop().map_err(driver)?;
            }
            self.wifi
                .set_configuration(&Configuration::Client(ClientConfiguration::default()))
                .map_err(driver)?;
            self.wifi.sta_netif_mut().set_hostname(&self.hostname).map_err(driver)?;
            self.wifi.start().map_err(driver)?;

            // SAFETY: the driver is started and `country` is NUL-terminated.
            let ret = unsafe {
                esp_idf_svc::sys::esp_wifi_set_country_code(self.country.as_ptr(), true)
            };
            if ret != esp_idf_svc::sys::ESP_OK as i32 {
                warn!("Wi-Fi: country code rejected ({})", ret);
            }
            Ok(())
        }

        fn mac(&mut self) -> Result<[u8; 6], NetworkError> {
            self.wifi.sta_netif().get_mac().map_err(driver)
        }

        fn disable_power_save(&mut self) -> Result<(), NetworkError> {
            // SAFETY: plain FFI call on a started driver.
            let ret = unsafe {
                esp_idf_svc::sys::esp_wifi_set_ps(esp_idf_svc::sys::wifi_ps_type_t_WIFI_PS_NONE)
            };
            if ret == esp_idf_svc::sys::ESP_OK as i32 {
                Ok(())
            } else {
                Err(NetworkError::Driver)
            }
        }

        fn scan(&mut self) -> Result<Vec<ScanResult>, NetworkError> {
            let aps = self.wifi.scan().map_err(|e| {
                warn!("Wi-Fi scan: {}", e);
                NetworkError::ScanFailed
            })?;
            info!("Wi-Fi: {} networks visible", aps.len());
            Ok(aps
                .into_iter()
                .filter_map(|ap| {
                    heapless::String::try_from(ap.ssid.as_str())
                        .ok()
                        .map(|ssid| ScanResult { ssid, rssi: ap.signal_strength })
                })
                .collect())
        }

        fn connect(&mut self, ssid: &str, password: &str) -> Result<(), NetworkError> {
            let config = ClientConfiguration {
                ssid: ssid.try_into().map_err(|_| NetworkError::Driver)?,
                password: password.try_into().map_err(|_| NetworkError::Driver)?,
                auth_method: if password.is_empty() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                ..Default::default()
            };
            self.wifi
                .set_configuration(&Configuration::Client(config))
                .map_err(driver)?;
            self.wifi.connect().map_err(driver)?;
            self.connect_started = Some(Instant::now());
            Ok(())
        }

        fn status(&mut self) -> LinkStatus {
            if self.wifi.sta_netif().is_up().unwrap_or(false) {
                return LinkStatus::GotIp;
            }
            if self.wifi.is_connected().unwrap_or(false) {
                return LinkStatus::NoIp;
            }
            match self.connect_started {
                Some(t) if t.elapsed() < CONNECT_TIMEOUT => LinkStatus::Connecting,
                Some(_) => LinkStatus::ConnectFail,
                None => LinkStatus::Idle,
            }
        }

        fn is_connected(&mut self) -> bool {
            self.wifi.is_connected().unwrap_or(false)
                && self.wifi.sta_netif().is_up().unwrap_or(false)
        }

        fn net_info(&mut self) -> Option<NetInfo> {
            let ip = self.wifi.sta_netif().get_ip_info().ok()?;
            Some(NetInfo {
                ip: ip.ip,
                netmask: prefix_to_netmask(ip.subnet.mask.0),
                gateway: ip.subnet.gateway,
                dns: ip.dns.unwrap_or(std::net::Ipv4Addr::UNSPECIFIED),
            })
        }
    }
}
