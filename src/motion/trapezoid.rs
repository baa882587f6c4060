//! Trapezoidal velocity profile generator
//!
//! Advances the step rate of the active block along its accelerate / cruise /
//! decelerate profile. All hot-path math is integer only; the acceleration
//! term is a fixed-point multiply keeping the high bits of a 64-bit product.

use crate::motion::block::MotionBlock;
use crate::motion::rate::{calc_timer, StepInterval, STEP_TIMER_HZ};

/// Phase of the velocity trapezoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrapezoidPhase {
    Accelerating,
    Cruising,
    Decelerating,
}

/// Convert an acceleration in steps/s^2 to the block's fixed-point
/// acceleration constant, scaled so that
/// `(elapsed_ticks * rate) >> 24` yields steps/s gained.
pub fn acceleration_rate_for(steps_per_s2: u32) -> u32 {
    (((steps_per_s2 as u64) << 24) / STEP_TIMER_HZ as u64) as u32
}

/// Per-block trapezoid state.
///
/// Reset at block pickup; `next_interval` is called once per timer tick after
/// the step events of that tick have been counted.
#[derive(Debug, Clone)]
pub struct TrapezoidGenerator {
    /// Rate reached by the acceleration ramp; the deceleration ramp starts
    /// from here.
    acc_step_rate: u32,
    /// Accumulated timer ticks spent accelerating.
    acceleration_time: u32,
    /// Accumulated timer ticks spent decelerating.
    deceleration_time: u32,
    /// Cached cruise interval (and its pulse multiplier).
    nominal: StepInterval,
    /// Rate most recently fed to the timer conversion.
    last_rate: u32,
}

impl TrapezoidGenerator {
    /// Initialize for a new block. Returns the generator together with the
    /// interval to program for the first tick.
    pub fn reset(block: &MotionBlock) -> (Self, StepInterval) {
        let nominal = calc_timer(block.nominal_rate);
        let initial = calc_timer(block.initial_rate);
        let generator = TrapezoidGenerator {
            acc_step_rate: block.initial_rate,
            acceleration_time: initial.ticks as u32,
            deceleration_time: 0,
            nominal,
            last_rate: block.initial_rate,
        };
        (generator, initial)
    }

    /// `(a * b) >> 24` with a widened intermediate.
    #[inline]
    fn mul_shift24(a: u32, b: u32) -> u32 {
        ((a as u64 * b as u64) >> 24) as u32
    }

    /// Phase the block is in after `completed` step events.
    pub fn phase(block: &MotionBlock, completed: u32) -> TrapezoidPhase {
        if completed <= block.accelerate_until {
            TrapezoidPhase::Accelerating
        } else if completed > block.decelerate_after {
            TrapezoidPhase::Decelerating
        } else {
            TrapezoidPhase::Cruising
        }
    }

    /// Pick the timer interval for the next tick.
    pub fn next_interval(&mut self, block: &MotionBlock, completed: u32) -> StepInterval {
        match Self::phase(block, completed) {
            TrapezoidPhase::Accelerating => {
                let mut rate = block.initial_rate
                    + Self::mul_shift24(self.acceleration_time, block.acceleration_rate);
                if rate > block.nominal_rate {
                    rate = block.nominal_rate;
                }
                self.acc_step_rate = rate;
                self.last_rate = rate;
                let interval = calc_timer(rate);
                self.acceleration_time += interval.ticks as u32;
                interval
            }
            TrapezoidPhase::Decelerating => {
                let delta = Self::mul_shift24(self.deceleration_time, block.acceleration_rate);
                // A delta past the ramp start would wrap; land on the floor.
                let mut rate = if delta > self.acc_step_rate {
                    block.final_rate
                } else {
                    self.acc_step_rate - delta
                };
                if rate < block.final_rate {
                    rate = block.final_rate;
                }
                self.last_rate = rate;
                let interval = calc_timer(rate);
                self.deceleration_time += interval.ticks as u32;
                interval
            }
            TrapezoidPhase::Cruising => {
                self.last_rate = block.nominal_rate;
                self.nominal
            }
        }
    }

    /// Rate most recently fed to the timer conversion.
    pub fn last_rate(&self) -> u32 {
        self.last_rate
    }
}
