//! Single-colour status LEDs.
//!
//! Used for the Wi-Fi indicator (blinks while associating, solid once
//! connected) and the onboard heartbeat.  Any `embedded-hal` output pin
//! works; write errors are ignored since the LED is informational.

use embedded_hal::digital::OutputPin;

use crate::app::ports::StatusIndicator;

pub struct StatusLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Construct with the LED off.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, on: true };
        led.set(false);
        led
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<P: OutputPin> StatusIndicator for StatusLed<P> {
    fn set(&mut self, on: bool) {
        let _ = if on { self.pin.set_high() } else { self.pin.set_low() };
        self.on = on;
    }

    fn toggle(&mut self) {
        self.set(!self.on);
    }
}
