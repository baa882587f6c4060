//! Motion primitives
//!
//! Block records, the shared block ring, and the integer-only hot-path math:
//! rate-to-interval conversion, the trapezoid generator, and the Bresenham
//! interpolator.

pub mod block;
pub mod interpolator;
pub mod rate;
pub mod trapezoid;

pub use block::{
    Axis, BlockConsumer, BlockProducer, BlockQueue, MotionBlock, BLOCK_BUFFER_SIZE, NUM_AXES,
};
pub use interpolator::Interpolator;
pub use rate::{calc_timer, StepInterval, MAX_STEP_FREQUENCY, MIN_TIMER_INTERVAL, STEP_TIMER_HZ};
pub use trapezoid::{acceleration_rate_for, TrapezoidGenerator, TrapezoidPhase};
