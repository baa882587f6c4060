//! Input seams: limit switches and system glue

use crate::motion::block::Axis;

/// Number of limit switches.
pub const NUM_SWITCHES: usize = 6;

/// Limit switch identifier. The extruder has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    XMin = 0,
    XMax = 1,
    YMin = 2,
    YMax = 3,
    ZMin = 4,
    ZMax = 5,
}

impl Switch {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The switch guarding travel on `axis` in the given direction, if any.
    pub fn limit(axis: Axis, reverse: bool) -> Option<Switch> {
        match (axis, reverse) {
            (Axis::X, true) => Some(Switch::XMin),
            (Axis::X, false) => Some(Switch::XMax),
            (Axis::Y, true) => Some(Switch::YMin),
            (Axis::Y, false) => Some(Switch::YMax),
            (Axis::Z, true) => Some(Switch::ZMin),
            (Axis::Z, false) => Some(Switch::ZMax),
            (Axis::E, _) => None,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Switch::XMin | Switch::XMax => Axis::X,
            Switch::YMin | Switch::YMax => Axis::Y,
            Switch::ZMin | Switch::ZMax => Axis::Z,
        }
    }
}

/// Raw limit switch levels. Polarity is applied by the endstop monitor from
/// the configuration.
pub trait EndstopInputs {
    fn read(&mut self, switch: Switch) -> bool;
}

/// Glue the interrupt body borrows from the surrounding firmware. Everything
/// defaults to a no-op so a minimal board implements nothing.
pub trait SystemHooks {
    /// Courtesy poll of serial input once per tick, for targets without a
    /// hardware FIFO.
    fn poll_serial(&mut self) {}

    /// Mains power is going away; skip the tick and leave the block for the
    /// shutdown path.
    fn power_loss_pending(&mut self) -> bool {
        false
    }

    /// Nozzle over-temperature fault is latched; inhibits valve energizing.
    fn nozzle_over_temp(&mut self) -> bool {
        false
    }

    /// A print from local media is running (suppresses the endstop alarm).
    fn media_printing(&mut self) -> bool {
        false
    }

    /// Millisecond clock for the alarm timing.
    fn now_ms(&mut self) -> u32 {
        0
    }
}
