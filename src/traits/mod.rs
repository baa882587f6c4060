//! Hardware abstraction traits
//!
//! These traits are the only way the core touches hardware. A board
//! implements them over its GPIO, timer, and glue subsystems; the interrupt
//! entry points take the combined [`Board`] bound.

pub mod inputs;
pub mod outputs;
pub mod timer;

pub use inputs::{EndstopInputs, Switch, SystemHooks, NUM_SWITCHES};
pub use outputs::{Driver, StepperPins};
pub use timer::StepTimer;

/// Everything the interrupt body needs from the board.
pub trait Board: StepperPins + EndstopInputs + StepTimer + SystemHooks {}

impl<T: StepperPins + EndstopInputs + StepTimer + SystemHooks> Board for T {}
