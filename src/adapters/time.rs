//! Wall-clock adapter.
//!
//! - Measurement timestamps as local time, `DD.MM.YYYY HH:MM:SS`.
//! - [`SntpClock`] implements [`ClockPort`]:
//!   - **`target_os = "espidf"`**: `esp_idf_svc::sntp`, blocking until the
//!     first sync completes or the timeout expires.
//!   - **all other targets**: the host clock is assumed correct.

use chrono::{Local, NaiveDateTime};

use crate::app::ports::ClockPort;
use crate::error::NetworkError;

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Format a wall-clock time the way the status page shows it.
pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Current local time, formatted.
pub fn local_timestamp() -> String {
    format_timestamp(&Local::now().naive_local())
}

/// SNTP-backed clock synchronisation.
pub struct SntpClock {
    timeout_ms: u32,
    #[cfg(target_os = "espidf")]
    sntp: Option<esp_idf_svc::sntp::EspSntp<'static>>,
}

impl SntpClock {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            #[cfg(target_os = "espidf")]
            sntp: None,
        }
    }
}

#[cfg(target_os = "espidf")]
impl ClockPort for SntpClock {
    fn sync(&mut self, host: &str) -> Result<(), NetworkError> {
        use esp_idf_svc::sntp::{EspSntp, SntpConf, SyncStatus};

        const POLL_MS: u32 = 100;

        // Dropping the previous service stops it before the new one starts.
        self.sntp = None;

        let mut conf = SntpConf::default();
        conf.servers[0] = host;
        let sntp = EspSntp::new(&conf).map_err(|e| {
            log::warn!("SNTP: start failed: {}", e);
            NetworkError::ClockSync
        })?;

        let mut waited = 0;
        while sntp.get_sync_status() != SyncStatus::Completed {
            if waited >= self.timeout_ms {
                self.sntp = Some(sntp);
                return Err(NetworkError::ClockSync);
            }
            std::thread::sleep(core::time::Duration::from_millis(u64::from(POLL_MS)));
            waited += POLL_MS;
        }

        log::info!("SNTP: synchronised, local time {}", local_timestamp());
        self.sntp = Some(sntp);
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl ClockPort for SntpClock {
    fn sync(&mut self, host: &str) -> Result<(), NetworkError> {
        log::info!(
            "SNTP(sim): {} ignored, using host clock (timeout {} ms)",
            host,
            self.timeout_ms
        );
        Ok(())
    }
}
