//! Fan relay driver.
//!
//! Relay output, its indicator LED, and the running-feedback input, all
//! through `embedded-hal` digital traits.  The relay and LED always follow
//! the same command; the feedback input is only reported, never acted on.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::FanOutput;

pub struct FanRelay<R, L, S> {
    relay: R,
    led: L,
    status: S,
    commanded: bool,
}

impl<R, L, S> FanRelay<R, L, S>
where
    R: OutputPin,
    L: OutputPin,
    S: InputPin,
{
    /// Construct with the fan off.
    pub fn new(relay: R, led: L, status: S) -> Self {
        let mut fan = Self { relay, led, status, commanded: true };
        fan.set_fan(false);
        fan
    }

    pub fn commanded(&self) -> bool {
        self.commanded
    }
}

fn drive<P: OutputPin>(pin: &mut P, on: bool) -> bool {
    let r = if on { pin.set_high() } else { pin.set_low() };
    r.is_ok()
}

impl<R, L, S> FanOutput for FanRelay<R, L, S>
where
    R: OutputPin,
    L: OutputPin,
    S: InputPin,
{
    fn set_fan(&mut self, on: bool) {
        if on == self.commanded {
            return;
        }
        if !drive(&mut self.relay, on) {
            warn!("Fan: relay write failed");
        }
        if !drive(&mut self.led, on) {
            warn!("Fan: indicator write failed");
        }
        self.commanded = on;
    }

    fn fan_running(&mut self) -> bool {
        self.status.is_high().unwrap_or(false)
    }
}
