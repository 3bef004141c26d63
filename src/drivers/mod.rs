//! Actuator drivers, timers, and peripheral helpers.

pub mod fan;
pub mod hw_timer;
pub mod status_led;
pub mod task_pin;
pub mod watchdog;
