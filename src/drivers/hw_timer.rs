//! Periodic base tick from ESP-IDF's `esp_timer`.
//!
//! The timer callback runs in the ESP timer task (not an ISR) and only
//! pushes [`Event::Tick`] into the event channel.  [`TickGate`] turns the
//! base tick into the slower measurement cadence.

use crate::events::{push_event, Event};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Passes every `every`-th tick, starting with the `every`-th.
#[derive(Debug, Clone, Copy)]
pub struct TickGate {
    every: u32,
    count: u32,
}

impl TickGate {
    pub fn new(every: u32) -> Self {
        Self { every: every.max(1), count: 0 }
    }

    /// Count one tick; `true` when this tick should run a measurement.
    pub fn tick(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.every {
            self.count = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(_arg: *mut core::ffi::c_void) {
    if !push_event(Event::Tick) {
        log::warn!("hw_timer: event channel full, tick dropped");
    }
}

/// Start the periodic tick.
#[cfg(target_os = "espidf")]
pub fn start(period_ms: u32) -> Result<(), EspError> {
    // SAFETY: TICK_TIMER is written once here from the main task before
    // the callback can fire; the callback only touches the channel.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"tick".as_ptr(),
            skip_unhandled_events: true,
        };
        esp!(esp_timer_create(&args, &raw mut TICK_TIMER))?;
        esp!(esp_timer_start_periodic(TICK_TIMER, u64::from(period_ms) * 1_000))?;
    }
    log::info!("hw_timer: tick every {} ms", period_ms);
    Ok(())
}

/// Host: a detached thread stands in for the ESP timer.
#[cfg(not(target_os = "espidf"))]
pub fn start(period_ms: u32) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("tick".into())
        .spawn(move || {
            loop {
                std::thread::sleep(std::time::Duration::from_millis(u64::from(period_ms)));
                let _ = push_event(Event::Tick);
            }
        })
        .map(|_| log::info!("hw_timer(sim): tick every {} ms", period_ms))
}
