//! Electromagnetic extrusion valve governor
//!
//! Machines with valve-fed extruders energize the valve while filament is
//! being pushed and release it once the extruder has been quiet for a while.
//! The timeout is counted in step events, not milliseconds: at a 4 kHz event
//! rate the 160-event window is about 40 ms of pure travel.

use crate::config::CarriageMode;
use crate::traits::outputs::StepperPins;

/// Travel-only step events before the valves release.
pub const VALVE_RELEASE_EVENTS: u16 = 160;

/// Per-machine valve state, advanced once per step event.
#[derive(Debug, Clone, Default)]
pub struct ValveGovernor {
    /// Travel events seen since the last extrusion step.
    idle_events: u16,
    /// Nozzle over-temperature fault; once seen, the valves stay released.
    nozzle_fault: bool,
}

impl ValveGovernor {
    pub fn new() -> Self {
        ValveGovernor::default()
    }

    pub fn nozzle_fault(&self) -> bool {
        self.nozzle_fault
    }

    fn energize(
        pins: &mut impl StepperPins,
        mode: CarriageMode,
        active_extruder: u8,
        on: bool,
    ) {
        match mode {
            CarriageMode::Independent if on => pins.set_valve(active_extruder, true),
            _ => {
                pins.set_valve(0, on);
                pins.set_valve(1, on);
            }
        }
    }

    /// Advance by one step event.
    ///
    /// `e_stepped`/`travel_stepped` say which groups pulsed during the
    /// event; `e_forward` is the current extruder direction.
    #[allow(clippy::too_many_arguments)]
    pub fn after_event(
        &mut self,
        e_stepped: bool,
        travel_stepped: bool,
        e_forward: bool,
        over_temp: bool,
        mode: CarriageMode,
        active_extruder: u8,
        pins: &mut impl StepperPins,
    ) {
        if over_temp {
            self.nozzle_fault = true;
        }
        if e_stepped {
            self.idle_events = 0;
        }
        if e_stepped || (!travel_stepped && self.idle_events <= VALVE_RELEASE_EVENTS) {
            let on = e_forward && !self.nozzle_fault;
            Self::energize(pins, mode, active_extruder, on);
        } else if !e_stepped && travel_stepped {
            self.idle_events += 1;
            if self.idle_events > VALVE_RELEASE_EVENTS {
                pins.set_valve(0, false);
                pins.set_valve(1, false);
                self.idle_events = 0;
            }
        }
    }
}
