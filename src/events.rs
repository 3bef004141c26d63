//! Timer-driven event channel.
//!
//! The periodic ESP timer pushes [`Event::Tick`] from the timer task; the
//! control loop blocks on [`wait_event`] and handles one event at a time.
//!
//! ```text
//!  esp_timer (1 Hz) ──try_send──▶ ┌──────────────┐ ──receive──▶ main loop
//!                                 │ EVENTS (8)   │
//!                                 └──────────────┘
//! ```
//!
//! A full channel drops the new event; the loop is then at least eight
//! ticks behind and the watchdog will decide.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

const EVENT_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// One period of the base timer elapsed.
    Tick,
}

static EVENTS: Channel<CriticalSectionRawMutex, Event, EVENT_DEPTH> = Channel::new();

/// Queue an event.  Returns `false` if the channel was full.
pub fn push_event(event: Event) -> bool {
    EVENTS.try_send(event).is_ok()
}

/// Block the calling thread until an event arrives.
pub fn wait_event() -> Event {
    futures_lite::future::block_on(EVENTS.receive())
}
