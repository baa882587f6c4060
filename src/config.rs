//! Static configuration for the stepper core
//!
//! Hardware-variant choices live in a plain record read once at startup
//! instead of behind conditional compilation. Defaults describe the
//! reference single-carriage Cartesian machine.

use crate::motion::block::NUM_AXES;
use crate::traits::inputs::NUM_SWITCHES;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the two X carriages are driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CarriageMode {
    /// Only the active extruder's carriage moves.
    #[default]
    Independent,
    /// Both carriages move together, same direction.
    Ganged,
    /// Both carriages move together, opposite directions.
    Mirrored,
}

/// Optional hardware and behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Features {
    /// Second X carriage with its own driver.
    pub dual_x_carriage: bool,
    /// Second Z driver, always in lockstep with the first.
    pub z_dual_drivers: bool,
    /// Second Z driver gated by the homing routine (see
    /// [`Stepper::set_z2_follows`](crate::stepper::Stepper::set_z2_follows)).
    pub dual_z: bool,
    /// Enable the Z driver only when a block actually moves Z, with a 1 ms
    /// settle before the first step.
    pub z_late_enable: bool,
    /// Electromagnetic extrusion valves follow extruder motion.
    pub valve: bool,
    /// Poll the power-loss hook at the top of every tick.
    pub power_loss_check: bool,
}

/// Startup configuration consumed by [`Stepper`](crate::stepper::Stepper).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepperConfig {
    /// Per-axis DIR polarity: true inverts the sense of "forward".
    pub invert_dir: [bool; NUM_AXES],
    /// Per-axis STEP idle level: true means the step line rests high and
    /// pulses low.
    pub invert_step: [bool; NUM_AXES],
    /// Per-axis ENABLE active level.
    pub enable_on: [bool; NUM_AXES],
    /// Per-switch inversion: true means the pin reads low when pressed.
    pub endstop_inverting: [bool; NUM_SWITCHES],
    /// Start with all endstop checks disabled; homing enables them.
    pub endstops_only_for_homing: bool,
    /// An endstop hit during a print should abort it.
    pub abort_on_endstop_hit: bool,
    /// Homing direction of the first X carriage (-1 or 1).
    pub x_home_dir: i8,
    /// Homing direction of the second X carriage.
    pub x2_home_dir: i8,
    /// Steps per millimeter, for supervisor-side position reporting only.
    pub steps_per_unit: [f32; NUM_AXES],
    pub features: Features,
}

impl Default for StepperConfig {
    fn default() -> Self {
        StepperConfig {
            invert_dir: [false; NUM_AXES],
            invert_step: [false; NUM_AXES],
            // Common drivers enable on a low line.
            enable_on: [false; NUM_AXES],
            endstop_inverting: [true; NUM_SWITCHES],
            endstops_only_for_homing: false,
            abort_on_endstop_hit: false,
            x_home_dir: -1,
            x2_home_dir: 1,
            steps_per_unit: [80.0, 80.0, 400.0, 95.0],
            features: Features::default(),
        }
    }
}
