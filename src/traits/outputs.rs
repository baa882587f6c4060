//! Output pin seams: step/direction/enable lines and auxiliary outputs

use crate::motion::block::Axis;

/// Physical driver channels. `X2`/`Z2` are the paired drivers of dual-X and
/// dual-Z machines; boards without them ignore the writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Driver {
    X = 0,
    X2 = 1,
    Y = 2,
    Z = 3,
    Z2 = 4,
    E0 = 5,
    E1 = 6,
}

impl Driver {
    pub const ALL: [Driver; 7] = [
        Driver::X,
        Driver::X2,
        Driver::Y,
        Driver::Z,
        Driver::Z2,
        Driver::E0,
        Driver::E1,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The logical axis this driver belongs to.
    pub fn axis(self) -> Axis {
        match self {
            Driver::X | Driver::X2 => Axis::X,
            Driver::Y => Axis::Y,
            Driver::Z | Driver::Z2 => Axis::Z,
            Driver::E0 | Driver::E1 => Axis::E,
        }
    }
}

/// Raw output lines of the stepper drivers.
///
/// The core applies all configured polarity itself; `level` is the value to
/// put on the wire.
pub trait StepperPins {
    /// Drive a DIRECTION line.
    fn set_direction(&mut self, driver: Driver, level: bool);

    /// Drive a STEP line. The core writes the leading edge, calls
    /// [`step_hold`](Self::step_hold), then writes the trailing edge.
    fn set_step(&mut self, driver: Driver, level: bool);

    /// Hold point between the edges of a step pulse. Boards size this to the
    /// driver datasheet minimum (1-2 us typical; the reference extruder
    /// driver wants ~14 us). The default relies on call latency alone.
    fn step_hold(&mut self, _axis: Axis) {}

    /// Drive an ENABLE line.
    fn set_enable(&mut self, driver: Driver, level: bool);

    /// Energize or release an extrusion valve (0 or 1).
    fn set_valve(&mut self, _index: u8, _energized: bool) {}

    /// Endstop alarm beeper.
    fn set_beeper(&mut self, _on: bool) {}

    /// Part cooling fan off, used when motion finishes.
    fn fan_off(&mut self) {}
}
