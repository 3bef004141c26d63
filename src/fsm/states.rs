//! Concrete state handler functions and table builder.
//!
//! ```text
//!            [delta > switch_min + hysteresis
//!             AND temperatures ok]
//!  FAN_OFF ─────────────────────────────────▶ FAN_ON
//!     ▲                                          │
//!     └──────────────────────────────────────────┘
//!            [delta < switch_min
//!             OR temperature below minimum]
//! ```
//!
//! Anything else holds the current state (the dead band).  The band is
//! asymmetric: it spans `[switch_min, switch_min + hysteresis]` rather
//! than being centred on `switch_min`.

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use log::info;

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — FanOff
        StateDescriptor {
            id: StateId::FanOff,
            name: "FanOff",
            on_enter: Some(fan_off_enter),
            on_exit: None,
            on_update: fan_off_update,
        },
        // Index 1 — FanOn
        StateDescriptor {
            id: StateId::FanOn,
            name: "FanOn",
            on_enter: Some(fan_on_enter),
            on_exit: None,
            on_update: fan_on_update,
        },
    ]
}

/// Pure transition function: the same table as a single match, for
/// callers that only need the decision.
pub fn next_state(current: StateId, ctx: &FsmContext) -> StateId {
    let update = match current {
        StateId::FanOff => fan_off_update,
        StateId::FanOn => fan_on_update,
    };
    update(ctx).unwrap_or(current)
}

// ═══════════════════════════════════════════════════════════════════════════
//  FAN_OFF
// ═══════════════════════════════════════════════════════════════════════════

fn fan_off_enter(ctx: &mut FsmContext) {
    ctx.fan_command = false;
    info!(
        "FAN_OFF: delta {:.1} K (switch-on above {:.1} K)",
        ctx.sample.dew_point_delta(),
        ctx.config.switch_on_delta()
    );
}

fn fan_off_update(ctx: &FsmContext) -> Option<StateId> {
    let g = &ctx.guards;
    if g.above_switch_on && g.temperatures_ok {
        return Some(StateId::FanOn);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  FAN_ON
// ═══════════════════════════════════════════════════════════════════════════

fn fan_on_enter(ctx: &mut FsmContext) {
    ctx.fan_command = true;
    info!(
        "FAN_ON: delta {:.1} K (switch-off below {:.1} K)",
        ctx.sample.dew_point_delta(),
        ctx.config.switch_min
    );
}

fn fan_on_update(ctx: &FsmContext) -> Option<StateId> {
    let g = &ctx.guards;
    if g.below_switch_off || !g.temperatures_ok {
        return Some(StateId::FanOff);
    }
    None
}
