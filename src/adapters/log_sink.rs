//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! structured line to the logger (UART / USB-CDC on the device).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// The single log line for `event`.
pub fn format_event(event: &AppEvent) -> String {
    match event {
        AppEvent::CycleCompleted(c) => format!(
            "MEAS | #{} | in={:.1}\u{00b0}C/{:.1}% Td={:.1}\u{00b0}C | \
             out={:.1}\u{00b0}C/{:.1}% Td={:.1}\u{00b0}C | fan={}/{} | {}us",
            c.counter,
            c.indoor_temp,
            c.indoor_hum,
            c.indoor_dew_point,
            c.outdoor_temp,
            c.outdoor_hum,
            c.outdoor_dew_point,
            if c.fan_commanded { "ON" } else { "OFF" },
            if c.fan_sensed { "RUN" } else { "STOP" },
            c.duration_us,
        ),
        AppEvent::FanSwitched { from, to } => format!("FAN | {:?} -> {:?}", from, to),
        AppEvent::CycleFailed(e) => format!("FAIL | {}", e),
        AppEvent::Started(state) => format!("START | initial_state={:?}", state),
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let line = format_event(event);
        match event {
            AppEvent::CycleFailed(_) => warn!("{}", line),
            _ => info!("{}", line),
        }
    }
}
