//! Step timer seam
//!
//! The board owns a compare-match timer ticking at
//! [`STEP_TIMER_HZ`](crate::motion::rate::STEP_TIMER_HZ) whose interrupt
//! calls [`Stepper::isr_tick`](crate::stepper::Stepper::isr_tick).

pub trait StepTimer {
    /// Program the next compare interval in timer ticks.
    fn set_interval(&mut self, ticks: u16);

    /// Unmask the compare interrupt.
    fn enable(&mut self);

    /// Mask the compare interrupt.
    fn disable(&mut self);
}
