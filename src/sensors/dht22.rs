//! DHT22 / AM2302 single-wire temperature and humidity sensor.
//!
//! Bit-banged over one open-drain GPIO through the `embedded-hal` 1.0
//! digital and delay traits, so the same driver runs on ESP-IDF pin
//! drivers and on host mocks.
//!
//! ## Wire protocol
//!
//! ```text
//!  host   ‾‾‾|____≥1ms____|‾‾ 30µs ‾‾|
//!  sensor                           |__80µs__|‾‾80µs‾‾|  40 × bit
//!  bit:   |__50µs__|‾‾ 26µs = 0 / 70µs = 1 ‾‾|
//! ```
//!
//! Frame: humidity ×10 (u16 BE), temperature ×10 (sign-magnitude u16 BE),
//! checksum = low byte of the sum of the first four bytes.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ClimateReading, ClimateSensor};
use crate::error::SensorError;

/// Maximum polling iterations (≈ µs) while waiting for a level change.
const LEVEL_TIMEOUT_US: u32 = 100;
/// Host start pulse.
const START_LOW_US: u32 = 1_100;
/// Sample point after the rising edge of a data bit.
const BIT_SAMPLE_US: u32 = 30;

/// Decode and verify one 40-bit frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let hum_raw = u16::from_be_bytes([frame[0], frame[1]]);
    let temp_raw = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature = f32::from(temp_raw) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature = -temperature;
    }

    Ok(ClimateReading {
        temperature,
        humidity: f32::from(hum_raw) / 10.0,
    })
}

/// DHT22 on an open-drain pin.
pub struct Dht22<P, D> {
    name: &'static str,
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(name: &'static str, pin: P, delay: D) -> Self {
        Self { name, pin, delay }
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        // Start signal.
        self.pin.set_low().map_err(|_| SensorError::Gpio)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::Gpio)?;

        // Response: low 80 µs, high 80 µs, then the first bit's low phase.
        self.wait_for(false).map_err(|_| SensorError::NoResponse)?;
        self.wait_for(true).map_err(|_| SensorError::NoResponse)?;
        self.wait_for(false).map_err(|_| SensorError::NoResponse)?;

        let mut frame = [0u8; 5];
        for byte in &mut frame {
            for _ in 0..8 {
                self.wait_for(true)?;
                self.delay.delay_us(BIT_SAMPLE_US);
                let one = self.pin.is_high().map_err(|_| SensorError::Gpio)?;
                *byte = (*byte << 1) | u8::from(one);
                if one {
                    self.wait_for(false)?;
                }
            }
        }
        Ok(frame)
    }

    fn wait_for(&mut self, high: bool) -> Result<(), SensorError> {
        for _ in 0..LEVEL_TIMEOUT_US {
            if self.pin.is_high().map_err(|_| SensorError::Gpio)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorError::Timeout)
    }
}

impl<P, D> ClimateSensor for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn name(&self) -> &str {
        self.name
    }

    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        // The bit timing does not survive being preempted mid-frame.
        let frame = critical_section::with(|_cs| self.read_frame())?;
        decode_frame(frame)
    }
}
