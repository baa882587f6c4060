//! Planner-produced motion blocks and the shared block ring
//!
//! A block is one linear move with constant kinematic parameters: per-axis
//! step counts, direction bits, and the start/cruise/end step rates of its
//! velocity trapezoid. Blocks are produced by the motion planner and consumed
//! by the stepper core through a single-producer single-consumer ring; the
//! planner holds the [`BlockProducer`] half, the core the [`BlockConsumer`]
//! half.

use heapless::spsc::{Consumer, Producer, Queue};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of logical axes (X, Y, Z plus the extruder).
pub const NUM_AXES: usize = 4;

/// Ring capacity. One slot distinguishes full from empty, so 15 blocks can
/// be queued at a time.
pub const BLOCK_BUFFER_SIZE: usize = 16;

/// The shared block ring.
pub type BlockQueue = Queue<MotionBlock, BLOCK_BUFFER_SIZE>;

/// Planner-side handle of the block ring.
pub type BlockProducer<'a> = Producer<'a, MotionBlock, BLOCK_BUFFER_SIZE>;

/// Stepper-side handle of the block ring.
pub type BlockConsumer<'a> = Consumer<'a, MotionBlock, BLOCK_BUFFER_SIZE>;

/// Logical machine axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
    /// Extruder
    E = 3,
}

impl Axis {
    /// All axes in pulse-emission order.
    pub const ALL: [Axis; NUM_AXES] = [Axis::X, Axis::Y, Axis::Z, Axis::E];

    /// Index into per-axis arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit of this axis in a direction bitmask.
    #[inline]
    pub fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

/// One unit of motion handed over by the planner.
///
/// Rates are in step events per second; `acceleration_rate` is the planner's
/// fixed-point acceleration constant (see
/// [`acceleration_rate_for`](crate::motion::trapezoid::acceleration_rate_for)).
///
/// Invariants guaranteed by the planner:
/// `accelerate_until <= decelerate_after <= step_event_count`, and
/// `initial_rate, final_rate <= nominal_rate`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionBlock {
    /// Absolute step count per axis.
    pub steps: [u32; NUM_AXES],
    /// Maximum of `steps`; the Bresenham denominator.
    pub step_event_count: u32,
    /// Bit set = negative travel on that axis.
    pub direction_bits: u8,
    /// Step rate at block entry.
    pub initial_rate: u32,
    /// Cruise step rate.
    pub nominal_rate: u32,
    /// Step rate at block exit.
    pub final_rate: u32,
    /// Fixed-point acceleration constant.
    pub acceleration_rate: u32,
    /// Step event at which acceleration ends.
    pub accelerate_until: u32,
    /// Step event after which deceleration starts.
    pub decelerate_after: u32,
    /// Tool selector (0 or 1).
    pub active_extruder: u8,
    /// Set by the core when the block is picked up for execution.
    pub busy: bool,
}

impl MotionBlock {
    /// Whether this block travels in the negative direction on `axis`.
    #[inline]
    pub fn is_reverse(&self, axis: Axis) -> bool {
        self.direction_bits & axis.mask() != 0
    }

    /// Signed unit direction of `axis` for this block.
    #[inline]
    pub fn direction(&self, axis: Axis) -> i8 {
        if self.is_reverse(axis) {
            -1
        } else {
            1
        }
    }

    /// Whether `axis` moves at all in this block.
    #[inline]
    pub fn has_steps(&self, axis: Axis) -> bool {
        self.steps[axis.index()] > 0
    }
}
