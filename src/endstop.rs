//! Endstop sampling, debouncing, and block truncation
//!
//! Limit switches are sampled once per timer tick against the direction of
//! the active block. A hit needs two consecutive asserted samples, must be
//! on the approach side, and the axis must actually be moving. On a hit the
//! absolute position is snapshotted, a sticky per-axis flag is raised for
//! the supervisor, and the active block is truncated.

use crate::config::StepperConfig;
use crate::motion::block::{Axis, MotionBlock, NUM_AXES};
use crate::traits::inputs::{EndstopInputs, Switch, NUM_SWITCHES};

/// Axes that carry limit switches.
const MONITORED_AXES: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

/// Debouncing endstop monitor with the per-axis/global enable matrix.
#[derive(Debug, Clone)]
pub struct EndstopMonitor {
    /// Per-axis check enables (X, Y, Z).
    check_axis: [bool; 3],
    /// Global check enable; a per-axis check runs if its own flag OR this
    /// one is set.
    check_all: bool,
    /// Previous sample per switch.
    old: [bool; NUM_SWITCHES],
    /// Sticky hit flags, cleared by the supervisor.
    hit: [bool; 3],
    /// Absolute position at the triggering sample.
    trigger_steps: [i32; 3],
}

impl EndstopMonitor {
    pub fn new(enabled: bool) -> Self {
        EndstopMonitor {
            check_axis: [enabled; 3],
            check_all: enabled,
            old: [false; NUM_SWITCHES],
            hit: [false; 3],
            trigger_steps: [0; 3],
        }
    }

    /// Toggle checks for one axis, or for everything (including the global
    /// flag) when `axis` is `None`.
    pub fn set_enabled(&mut self, on: bool, axis: Option<Axis>) {
        match axis {
            Some(Axis::E) => {}
            Some(axis) => self.check_axis[axis.index()] = on,
            None => {
                self.check_axis = [on; 3];
                self.check_all = on;
            }
        }
    }

    fn check_enabled(&self, axis: Axis) -> bool {
        self.check_all || self.check_axis[axis.index()]
    }

    /// Any check enabled at all (gates the audible alarm).
    pub fn any_enabled(&self) -> bool {
        self.check_all || self.check_axis.iter().any(|&on| on)
    }

    /// Sticky hit flag for `axis`.
    pub fn hit(&self, axis: Axis) -> bool {
        match axis {
            Axis::E => false,
            _ => self.hit[axis.index()],
        }
    }

    pub fn any_hit(&self) -> bool {
        self.hit.iter().any(|&h| h)
    }

    /// Position snapshot taken when `axis` triggered.
    pub fn trigger_position(&self, axis: Axis) -> i32 {
        match axis {
            Axis::E => 0,
            _ => self.trigger_steps[axis.index()],
        }
    }

    /// Drop the sticky flags; homing hits endstops on purpose.
    pub fn clear_hits(&mut self) {
        self.hit = [false; 3];
    }

    /// With two X carriages the endstop only counts in the homing direction
    /// of the carriage the block drives.
    fn x_carriage_gate(config: &StepperConfig, block: &MotionBlock, reverse: bool) -> bool {
        if !config.features.dual_x_carriage {
            return true;
        }
        let home_dir = if block.active_extruder == 0 {
            config.x_home_dir
        } else {
            config.x2_home_dir
        };
        home_dir == if reverse { -1 } else { 1 }
    }

    /// Sample the switches facing the block's travel. Returns true when the
    /// block must be truncated.
    pub fn check_block(
        &mut self,
        block: &MotionBlock,
        position: &[i32; NUM_AXES],
        config: &StepperConfig,
        inputs: &mut impl EndstopInputs,
    ) -> bool {
        let mut truncate = false;
        for axis in MONITORED_AXES {
            if !self.check_enabled(axis) {
                continue;
            }
            let reverse = block.is_reverse(axis);
            if axis == Axis::X && !Self::x_carriage_gate(config, block, reverse) {
                continue;
            }
            let switch = match Switch::limit(axis, reverse) {
                Some(switch) => switch,
                None => continue,
            };
            let pressed = inputs.read(switch) != config.endstop_inverting[switch.index()];
            if pressed && self.old[switch.index()] && block.has_steps(axis) {
                self.trigger_steps[axis.index()] = position[axis.index()];
                self.hit[axis.index()] = true;
                truncate = true;
            }
            self.old[switch.index()] = pressed;
        }
        truncate
    }
}
