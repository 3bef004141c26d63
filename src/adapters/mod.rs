//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements  | Connects to               |
//! |-------------|-------------|---------------------------|
//! | `log_sink`  | EventSink   | Serial log output         |
//! | `time`      | ClockPort   | SNTP / system clock       |
//! | `wifi`      | WifiPort    | ESP-IDF Wi-Fi STA         |
//! | `device_id` | -           | eFuse factory MAC         |
//!
//! Sensors and the fan relay live in `sensors` and `drivers`.

pub mod device_id;
pub mod log_sink;
pub mod time;
pub mod wifi;
