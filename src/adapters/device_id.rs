//! Device identity from the factory MAC address.
//!
//! The short ID (`DF-XXYYZZ`, last three MAC bytes) tags the boot log and
//! is the hostname fallback when the configuration leaves it empty.

use core::fmt::Write;

pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is exactly the six bytes the call writes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: a fixed, locally administered MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x02, 0x00, 0x00, 0xDE, 0xF0, 0x01]
}

/// A radio that reports all zeros has not been initialised.
pub fn is_unset(mac: &MacAddress) -> bool {
    mac.iter().all(|b| *b == 0)
}

/// `AA:BB:CC:DD:EE:FF`
pub fn format_mac(mac: &MacAddress) -> heapless::String<17> {
    let mut s = heapless::String::new();
    let _ = write!(
        s,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    s
}

/// `DF-XXYYZZ`
pub fn device_id(mac: &MacAddress) -> heapless::String<16> {
    let mut id = heapless::String::new();
    let _ = write!(id, "DF-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// `dewfan-xxyyzz`
pub fn default_hostname(mac: &MacAddress) -> heapless::String<32> {
    let mut name = heapless::String::new();
    let _ = write!(name, "dewfan-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
    name
}
