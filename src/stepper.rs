//! Block consumer, interrupt body, and control surface
//!
//! [`Stepper`] owns every piece of state the step interrupt touches: the
//! consumer half of the block ring, the per-block execution state, absolute
//! position counters, and the endstop monitor. The board's timer interrupt
//! is a thin trampoline into [`Stepper::isr_tick`]; the remaining methods
//! form the synchronous control surface used by the rest of the firmware.
//! Builds with a preemptive step interrupt keep the instance in their
//! platform's critical-section cell, so every control-surface call is
//! atomic against the interrupt.

use heapless::Vec;

use crate::config::{CarriageMode, StepperConfig};
use crate::endstop::EndstopMonitor;
use crate::motion::block::{Axis, BlockConsumer, MotionBlock, NUM_AXES};
use crate::motion::interpolator::Interpolator;
use crate::motion::trapezoid::TrapezoidGenerator;
use crate::traits::inputs::Switch;
use crate::traits::outputs::{Driver, StepperPins};
use crate::traits::timer::StepTimer;
use crate::traits::Board;
use crate::valve::ValveGovernor;

/// Interval programmed while the block ring is empty (1 kHz at the 2 MHz
/// timer), so pickup latency stays bounded.
pub const IDLE_INTERVAL_TICKS: u16 = 2000;

/// Settle delay after a late Z enable (1 ms) before the first Z step.
const Z_SETTLE_TICKS: u16 = 2000;

/// Interval programmed at init, before the first block arrives.
const STARTUP_INTERVAL_TICKS: u16 = 0x4000;

/// Audible alarm length when an endstop newly asserts.
const ALARM_BEEP_MS: u32 = 150;

/// Switch set watched by the audible alarm.
const ALARM_SWITCHES: [Switch; 4] = [Switch::XMin, Switch::XMax, Switch::YMin, Switch::ZMin];

/// Sticky counters the supervisor can read out-of-band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Times the timer interval hit its floor (requested step rate too
    /// high for the tick budget).
    pub rate_clamp_events: u32,
    /// The step rate that caused the most recent clamp.
    pub last_clamped_rate: u32,
}

/// One axis of an endstop hit report, position already in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndstopHit {
    pub axis: Axis,
    pub position_mm: f32,
}

/// Result of [`Stepper::check_endstop_hits`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndstopReport {
    pub hits: Vec<EndstopHit, 3>,
    /// The abort-on-endstop feature is enabled; the caller should stop the
    /// print (stop media, quick-stop, zero hotend targets).
    pub abort_print: bool,
}

/// Execution state of the block currently being traced.
#[derive(Debug)]
struct ActiveBlock {
    block: MotionBlock,
    interp: Interpolator,
    trapezoid: TrapezoidGenerator,
    /// Step events to run on the next tick.
    loops: u8,
}

enum Pickup {
    Ready(ActiveBlock),
    /// Block picked up but the tick ends early (late Z enable settling).
    Settling(ActiveBlock),
}

/// The stepper motion execution core.
pub struct Stepper<'q> {
    queue: BlockConsumer<'q>,
    config: StepperConfig,
    carriage_mode: CarriageMode,
    /// Second Z driver follows the first; homing drops this while it
    /// levels the gantry.
    z2_follows: bool,
    active: Option<ActiveBlock>,
    /// Absolute step counters in machine coordinates.
    position: [i32; NUM_AXES],
    /// Signed unit direction per axis; valid while a block is active.
    direction: [i8; NUM_AXES],
    endstops: EndstopMonitor,
    valve: ValveGovernor,
    quick_stop_requested: bool,
    /// Asserted alarm-switch count from the previous tick.
    alarm_pressed: u8,
    alarm_since: Option<u32>,
    diagnostics: Diagnostics,
}

impl<'q> Stepper<'q> {
    pub fn new(queue: BlockConsumer<'q>, config: StepperConfig) -> Self {
        let endstops = EndstopMonitor::new(!config.endstops_only_for_homing);
        Stepper {
            queue,
            config,
            carriage_mode: CarriageMode::default(),
            z2_follows: true,
            active: None,
            position: [0; NUM_AXES],
            direction: [1; NUM_AXES],
            endstops,
            valve: ValveGovernor::new(),
            quick_stop_requested: false,
            alarm_pressed: 0,
            alarm_since: None,
            diagnostics: Diagnostics::default(),
        }
    }

    // ---- interrupt body -------------------------------------------------

    /// One step-timer tick. Called from the board's compare-match interrupt.
    pub fn isr_tick(&mut self, hw: &mut impl Board) {
        if self.quick_stop_requested {
            return;
        }
        if self.config.features.power_loss_check && hw.power_loss_pending() {
            // The shutdown path owns the machine from here; leave the block
            // untouched.
            return;
        }

        self.update_alarm(hw);

        let mut active = match self.active.take() {
            Some(active) => active,
            None => match self.begin_next_block(hw) {
                Some(Pickup::Ready(active)) => active,
                Some(Pickup::Settling(active)) => {
                    self.active = Some(active);
                    return;
                }
                None => {
                    hw.set_interval(IDLE_INTERVAL_TICKS);
                    return;
                }
            },
        };

        self.apply_directions(&active.block, hw);

        if self
            .endstops
            .check_block(&active.block, &self.position, &self.config, hw)
        {
            active.interp.force_complete(active.block.step_event_count);
        }

        self.run_step_loops(&mut active, hw);

        let interval = active
            .trapezoid
            .next_interval(&active.block, active.interp.completed());
        hw.set_interval(interval.ticks);
        active.loops = interval.loops;
        if interval.clamped {
            self.diagnostics.rate_clamp_events += 1;
            self.diagnostics.last_clamped_rate = active.trapezoid.last_rate();
        }

        if active.interp.completed() < active.block.step_event_count {
            self.active = Some(active);
        }
        // Otherwise the block drops here, which returns its ring slot to
        // the planner.
    }

    fn begin_next_block(&mut self, hw: &mut impl Board) -> Option<Pickup> {
        let mut block = self.queue.dequeue()?;
        block.busy = true;

        let (trapezoid, initial) = TrapezoidGenerator::reset(&block);
        hw.set_interval(initial.ticks);
        let interp = Interpolator::new(block.step_event_count);
        let settle = self.config.features.z_late_enable && block.has_steps(Axis::Z);
        let active = ActiveBlock {
            loops: initial.loops,
            block,
            interp,
            trapezoid,
        };

        if settle {
            // The Z driver was left disabled between moves; give it time to
            // wake before the first edge.
            self.enable_axis(hw, Axis::Z, true);
            hw.set_interval(Z_SETTLE_TICKS);
            Some(Pickup::Settling(active))
        } else {
            Some(Pickup::Ready(active))
        }
    }

    /// Beep for a short while when a watched switch newly asserts outside
    /// of media prints.
    fn update_alarm(&mut self, hw: &mut impl Board) {
        let mut pressed = 0u8;
        for switch in ALARM_SWITCHES {
            if hw.read(switch) != self.config.endstop_inverting[switch.index()] {
                pressed += 1;
            }
        }
        if pressed > self.alarm_pressed && !hw.media_printing() && self.endstops.any_enabled() {
            self.alarm_since = Some(hw.now_ms());
            hw.set_beeper(true);
        }
        if let Some(since) = self.alarm_since {
            if hw.now_ms().wrapping_sub(since) > ALARM_BEEP_MS && !hw.media_printing() {
                self.alarm_since = None;
                hw.set_beeper(false);
            }
        }
        self.alarm_pressed = pressed;
    }

    fn apply_directions(&mut self, block: &MotionBlock, hw: &mut impl StepperPins) {
        // X, with carriage fan-out.
        let reverse = block.is_reverse(Axis::X);
        let invert = self.config.invert_dir[Axis::X.index()];
        let level = if reverse { invert } else { !invert };
        if self.config.features.dual_x_carriage {
            match self.carriage_mode {
                CarriageMode::Ganged => {
                    hw.set_direction(Driver::X, level);
                    hw.set_direction(Driver::X2, level);
                }
                CarriageMode::Mirrored => {
                    hw.set_direction(Driver::X, level);
                    hw.set_direction(Driver::X2, !level);
                }
                CarriageMode::Independent => {
                    if block.active_extruder != 0 {
                        hw.set_direction(Driver::X2, level);
                    } else {
                        hw.set_direction(Driver::X, level);
                    }
                }
            }
        } else {
            hw.set_direction(Driver::X, level);
        }
        self.direction[Axis::X.index()] = block.direction(Axis::X);

        // Y.
        let reverse = block.is_reverse(Axis::Y);
        let invert = self.config.invert_dir[Axis::Y.index()];
        hw.set_direction(Driver::Y, if reverse { invert } else { !invert });
        self.direction[Axis::Y.index()] = block.direction(Axis::Y);

        // Z, with the paired driver when engaged.
        let reverse = block.is_reverse(Axis::Z);
        let invert = self.config.invert_dir[Axis::Z.index()];
        let level = if reverse { invert } else { !invert };
        hw.set_direction(Driver::Z, level);
        if self.z2_engaged() {
            hw.set_direction(Driver::Z2, level);
        }
        self.direction[Axis::Z.index()] = block.direction(Axis::Z);

        // E, routed to the active extruder's driver.
        let reverse = block.is_reverse(Axis::E);
        let invert = self.config.invert_dir[Axis::E.index()];
        let driver = if block.active_extruder == 1 {
            Driver::E1
        } else {
            Driver::E0
        };
        hw.set_direction(driver, if reverse { invert } else { !invert });
        self.direction[Axis::E.index()] = block.direction(Axis::E);
    }

    fn run_step_loops(&mut self, active: &mut ActiveBlock, hw: &mut impl Board) {
        for _ in 0..active.loops {
            // Courtesy poll so long moves don't starve serial input.
            hw.poll_serial();

            let mut e_stepped = false;
            let mut travel_stepped = false;
            for axis in Axis::ALL {
                if active.interp.step_axis(axis, &active.block) {
                    self.emit_step(axis, &active.block, hw);
                    if axis == Axis::E {
                        e_stepped = true;
                    } else {
                        travel_stepped = true;
                    }
                }
            }

            let completed = active.interp.complete_event();

            if self.config.features.valve {
                let over_temp = hw.nozzle_over_temp();
                self.valve.after_event(
                    e_stepped,
                    travel_stepped,
                    self.direction[Axis::E.index()] == 1,
                    over_temp,
                    self.carriage_mode,
                    active.block.active_extruder,
                    hw,
                );
            }

            if completed >= active.block.step_event_count {
                break;
            }
        }
    }

    /// Drivers to pulse for one step on `axis`.
    fn step_drivers(&self, axis: Axis, block: &MotionBlock) -> (Driver, Option<Driver>) {
        match axis {
            Axis::X => {
                if self.config.features.dual_x_carriage {
                    match self.carriage_mode {
                        CarriageMode::Ganged | CarriageMode::Mirrored => {
                            (Driver::X, Some(Driver::X2))
                        }
                        CarriageMode::Independent => {
                            if block.active_extruder == 1 {
                                (Driver::X2, None)
                            } else {
                                (Driver::X, None)
                            }
                        }
                    }
                } else {
                    (Driver::X, None)
                }
            }
            Axis::Y => (Driver::Y, None),
            Axis::Z => {
                let paired = if self.z2_engaged() {
                    Some(Driver::Z2)
                } else {
                    None
                };
                (Driver::Z, paired)
            }
            Axis::E => {
                if block.active_extruder == 1 {
                    (Driver::E1, None)
                } else {
                    (Driver::E0, None)
                }
            }
        }
    }

    /// One full pulse: leading edge, position update, hold, trailing edge.
    fn emit_step(&mut self, axis: Axis, block: &MotionBlock, hw: &mut impl StepperPins) {
        let (primary, paired) = self.step_drivers(axis, block);
        let invert = self.config.invert_step[axis.index()];

        hw.set_step(primary, !invert);
        if let Some(pair) = paired {
            hw.set_step(pair, !invert);
        }

        // Readers in a critical section see the post-step position as soon
        // as the leading edge is out.
        self.position[axis.index()] += self.direction[axis.index()] as i32;

        hw.step_hold(axis);
        hw.set_step(primary, invert);
        if let Some(pair) = paired {
            hw.set_step(pair, invert);
        }
    }

    fn z2_engaged(&self) -> bool {
        self.config.features.z_dual_drivers || (self.config.features.dual_z && self.z2_follows)
    }

    fn enable_level(&self, axis: Axis, on: bool) -> bool {
        let active = self.config.enable_on[axis.index()];
        if on {
            active
        } else {
            !active
        }
    }

    fn enable_axis(&self, hw: &mut impl StepperPins, axis: Axis, on: bool) {
        let level = self.enable_level(axis, on);
        match axis {
            Axis::X => {
                hw.set_enable(Driver::X, level);
                if self.config.features.dual_x_carriage {
                    hw.set_enable(Driver::X2, level);
                }
            }
            Axis::Y => hw.set_enable(Driver::Y, level),
            Axis::Z => {
                hw.set_enable(Driver::Z, level);
                if self.config.features.z_dual_drivers || self.config.features.dual_z {
                    hw.set_enable(Driver::Z2, level);
                }
            }
            Axis::E => {
                hw.set_enable(Driver::E0, level);
                hw.set_enable(Driver::E1, level);
            }
        }
    }

    // ---- control surface ------------------------------------------------

    /// Bring up outputs and the step timer. Drivers start disabled, step
    /// lines at their idle level, valves released.
    pub fn init(&mut self, hw: &mut impl Board) {
        for driver in Driver::ALL {
            hw.set_enable(driver, self.enable_level(driver.axis(), false));
            hw.set_step(driver, self.config.invert_step[driver.axis().index()]);
        }
        hw.set_valve(0, false);
        hw.set_valve(1, false);

        hw.set_interval(STARTUP_INTERVAL_TICKS);
        hw.enable();

        self.endstops
            .set_enabled(!self.config.endstops_only_for_homing, None);
    }

    /// Unmask the step interrupt.
    pub fn wake(&self, hw: &mut impl StepTimer) {
        hw.enable();
    }

    /// A block is executing or queued.
    pub fn is_moving(&self) -> bool {
        self.active.is_some() || self.queue.ready()
    }

    pub fn blocks_queued(&self) -> bool {
        self.queue.ready()
    }

    /// Block until all buffered motion has executed, pumping the caller's
    /// cooperative tasks (heater management, inactivity, UI) in between.
    /// Interrupt-driven builds must not hold the instance's critical
    /// section across the wait; poll [`is_moving`](Self::is_moving) per
    /// iteration instead.
    pub fn synchronize(&self, mut idle: impl FnMut()) {
        while self.is_moving() {
            idle();
        }
    }

    /// Overwrite the absolute counters.
    pub fn set_position(&mut self, x: i32, y: i32, z: i32, e: i32) {
        self.position = [x, y, z, e];
    }

    /// Overwrite the extruder counter only.
    pub fn set_e_position(&mut self, e: i32) {
        self.position[Axis::E.index()] = e;
    }

    /// Absolute step counter of `axis`.
    pub fn position(&self, axis: Axis) -> i32 {
        self.position[axis.index()]
    }

    /// Signed unit direction last applied on `axis`.
    pub fn direction(&self, axis: Axis) -> i8 {
        self.direction[axis.index()]
    }

    /// Progress of the active block as `(completed, total)` step events.
    pub fn progress(&self) -> Option<(u32, u32)> {
        self.active
            .as_ref()
            .map(|active| (active.interp.completed(), active.block.step_event_count))
    }

    /// Drop all buffered motion immediately. The interrupt is masked for
    /// the drain and the in-flight tick is inhibited by the request flag.
    pub fn quick_stop(&mut self, hw: &mut impl StepTimer) {
        self.quick_stop_requested = true;
        hw.disable();
        while self.queue.dequeue().is_some() {}
        self.active = None;
        self.quick_stop_requested = false;
        hw.enable();
    }

    /// Power down all drivers after motion has finished; also stops the
    /// part fan.
    pub fn finish_and_disable(&self, hw: &mut impl StepperPins) {
        for driver in Driver::ALL {
            hw.set_enable(driver, self.enable_level(driver.axis(), false));
        }
        hw.fan_off();
    }

    /// Toggle endstop checks for one axis, or all of them when `axis` is
    /// `None`.
    pub fn enable_endstops(&mut self, on: bool, axis: Option<Axis>) {
        self.endstops.set_enabled(on, axis);
    }

    /// Sticky hit flag of `axis`.
    pub fn endstop_hit(&self, axis: Axis) -> bool {
        self.endstops.hit(axis)
    }

    /// Clear sticky hit flags; homing moves hit endstops on purpose.
    pub fn clear_endstop_hits(&mut self) {
        self.endstops.clear_hits();
    }

    /// Collect and clear any sticky endstop hits, with trigger positions
    /// converted to millimeters for display.
    pub fn check_endstop_hits(&mut self) -> Option<EndstopReport> {
        if !self.endstops.any_hit() {
            return None;
        }
        let mut hits = Vec::new();
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            if self.endstops.hit(axis) {
                let steps = self.endstops.trigger_position(axis);
                let position_mm = steps as f32 / self.config.steps_per_unit[axis.index()];
                let _ = hits.push(EndstopHit { axis, position_mm });
            }
        }
        self.endstops.clear_hits();
        Some(EndstopReport {
            hits,
            abort_print: self.config.abort_on_endstop_hit,
        })
    }

    pub fn carriage_mode(&self) -> CarriageMode {
        self.carriage_mode
    }

    pub fn set_carriage_mode(&mut self, mode: CarriageMode) {
        self.carriage_mode = mode;
    }

    /// Gate the second Z driver. Homing drops this while it levels the
    /// gantry one driver at a time.
    pub fn set_z2_follows(&mut self, follows: bool) {
        self.z2_follows = follows;
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    pub fn config(&self) -> &StepperConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::block::{BlockQueue, NUM_AXES};
    use crate::traits::inputs::{EndstopInputs, SystemHooks, NUM_SWITCHES};

    #[derive(Default)]
    struct TestBoard {
        step_level: [bool; 7],
        pulses: [u32; 7],
        enable_level: [Option<bool>; 7],
        valves: [Option<bool>; 2],
        last_interval: u16,
        timer_enabled: bool,
        switches: [bool; NUM_SWITCHES],
    }

    impl StepperPins for TestBoard {
        fn set_direction(&mut self, _driver: Driver, _level: bool) {}
        fn set_step(&mut self, driver: Driver, level: bool) {
            if level && !self.step_level[driver.index()] {
                self.pulses[driver.index()] += 1;
            }
            self.step_level[driver.index()] = level;
        }
        fn set_enable(&mut self, driver: Driver, level: bool) {
            self.enable_level[driver.index()] = Some(level);
        }
        fn set_valve(&mut self, index: u8, energized: bool) {
            self.valves[index as usize] = Some(energized);
        }
    }

    impl EndstopInputs for TestBoard {
        fn read(&mut self, switch: Switch) -> bool {
            self.switches[switch.index()]
        }
    }

    impl StepTimer for TestBoard {
        fn set_interval(&mut self, ticks: u16) {
            self.last_interval = ticks;
        }
        fn enable(&mut self) {
            self.timer_enabled = true;
        }
        fn disable(&mut self) {
            self.timer_enabled = false;
        }
    }

    impl SystemHooks for TestBoard {}

    /// Straight-through switch polarity so an all-low board reads released.
    fn plain_config() -> StepperConfig {
        StepperConfig {
            endstop_inverting: [false; NUM_SWITCHES],
            ..Default::default()
        }
    }

    fn cruise_block(steps: [u32; NUM_AXES], direction_bits: u8, rate: u32) -> MotionBlock {
        let count = *steps.iter().max().unwrap();
        MotionBlock {
            steps,
            step_event_count: count,
            direction_bits,
            initial_rate: rate,
            nominal_rate: rate,
            final_rate: rate,
            accelerate_until: 0,
            decelerate_after: count,
            ..Default::default()
        }
    }

    fn run(stepper: &mut Stepper<'_>, board: &mut TestBoard, max_ticks: u32) -> u32 {
        let mut ticks = 0;
        while ticks < max_ticks {
            stepper.isr_tick(board);
            ticks += 1;
            if !stepper.is_moving() {
                break;
            }
        }
        ticks
    }

    #[test]
    fn test_init_disables_drivers_and_arms_timer() {
        let mut queue = BlockQueue::new();
        let (_tx, rx) = queue.split();
        let mut stepper = Stepper::new(rx, plain_config());
        let mut board = TestBoard::default();

        stepper.init(&mut board);

        // enable_on is active-low by default, so "disabled" is a high line.
        for driver in Driver::ALL {
            assert_eq!(board.enable_level[driver.index()], Some(true));
        }
        assert_eq!(board.valves, [Some(false), Some(false)]);
        assert!(board.timer_enabled);
        assert_eq!(board.last_interval, STARTUP_INTERVAL_TICKS);
    }

    #[test]
    fn test_idle_tick_reprograms_one_khz() {
        let mut queue = BlockQueue::new();
        let (_tx, rx) = queue.split();
        let mut stepper = Stepper::new(rx, plain_config());
        let mut board = TestBoard::default();

        stepper.isr_tick(&mut board);
        assert_eq!(board.last_interval, IDLE_INTERVAL_TICKS);
        assert!(!stepper.is_moving());
    }

    #[test]
    fn test_block_executes_to_exact_position() {
        let mut queue = BlockQueue::new();
        let (mut tx, rx) = queue.split();
        let mut stepper = Stepper::new(rx, plain_config());
        let mut board = TestBoard::default();

        tx.enqueue(cruise_block([100, 0, 0, 0], 0, 1000)).unwrap();
        run(&mut stepper, &mut board, 1000);

        assert_eq!(board.pulses[Driver::X.index()], 100);
        assert_eq!(board.pulses[Driver::Y.index()], 0);
        assert_eq!(stepper.position(Axis::X), 100);
        assert!(!stepper.is_moving());
    }

    #[test]
    fn test_reverse_block_counts_down() {
        let mut queue = BlockQueue::new();
        let (mut tx, rx) = queue.split();
        let mut stepper = Stepper::new(rx, plain_config());
        let mut board = TestBoard::default();

        tx.enqueue(cruise_block([0, 40, 0, 0], Axis::Y.mask(), 1000))
            .unwrap();
        run(&mut stepper, &mut board, 1000);

        assert_eq!(stepper.position(Axis::Y), -40);
        assert_eq!(stepper.direction(Axis::Y), -1);
    }

    #[test]
    fn test_quick_stop_on_empty_buffer_is_a_no_op() {
        let mut queue = BlockQueue::new();
        let (_tx, rx) = queue.split();
        let mut stepper = Stepper::new(rx, plain_config());
        let mut board = TestBoard::default();

        stepper.set_position(5, 6, 7, 8);
        stepper.quick_stop(&mut board);

        assert!(board.timer_enabled);
        assert!(!stepper.is_moving());
        assert_eq!(stepper.position(Axis::X), 5);
        assert_eq!(stepper.position(Axis::E), 8);
    }

    #[test]
    fn test_quick_stop_drains_queue_and_active_block() {
        let mut queue = BlockQueue::new();
        let (mut tx, rx) = queue.split();
        let mut stepper = Stepper::new(rx, plain_config());
        let mut board = TestBoard::default();

        for _ in 0..3 {
            tx.enqueue(cruise_block([100, 0, 0, 0], 0, 1000)).unwrap();
        }
        // Get partway into the first block.
        for _ in 0..10 {
            stepper.isr_tick(&mut board);
        }
        assert!(stepper.is_moving());
        let travelled = stepper.position(Axis::X);

        stepper.quick_stop(&mut board);

        assert!(!stepper.is_moving());
        assert!(!stepper.blocks_queued());
        // Position reflects exactly the pulses emitted, nothing more.
        assert_eq!(travelled, board.pulses[Driver::X.index()] as i32);
        assert_eq!(stepper.position(Axis::X), travelled);

        // And the core comes back up cleanly afterwards.
        stepper.isr_tick(&mut board);
        assert_eq!(board.last_interval, IDLE_INTERVAL_TICKS);
    }

    #[test]
    fn test_z_late_enable_settles_before_stepping() {
        let mut queue = BlockQueue::new();
        let (mut tx, rx) = queue.split();
        let config = StepperConfig {
            features: crate::config::Features {
                z_late_enable: true,
                ..Default::default()
            },
            ..plain_config()
        };
        let mut stepper = Stepper::new(rx, config);
        let mut board = TestBoard::default();

        tx.enqueue(cruise_block([0, 0, 20, 0], 0, 1000)).unwrap();

        // Pickup tick: Z enabled, settle interval, no pulses yet.
        stepper.isr_tick(&mut board);
        assert_eq!(
            board.enable_level[Driver::Z.index()],
            Some(false),
            "Z driver should be enabled (active-low)"
        );
        assert_eq!(board.last_interval, Z_SETTLE_TICKS);
        assert_eq!(board.pulses[Driver::Z.index()], 0);
        assert!(stepper.is_moving());

        run(&mut stepper, &mut board, 1000);
        assert_eq!(board.pulses[Driver::Z.index()], 20);
        assert_eq!(stepper.position(Axis::Z), 20);
    }

    #[test]
    fn test_synchronize_returns_when_drained() {
        let mut queue = BlockQueue::new();
        let (_tx, rx) = queue.split();
        let stepper = Stepper::new(rx, plain_config());

        let mut pumped = 0u32;
        stepper.synchronize(|| pumped += 1);
        assert_eq!(pumped, 0);
    }

    #[test]
    fn test_set_position_overwrites_counters() {
        let mut queue = BlockQueue::new();
        let (_tx, rx) = queue.split();
        let mut stepper = Stepper::new(rx, plain_config());

        stepper.set_position(1, 2, 3, 4);
        assert_eq!(stepper.position(Axis::Z), 3);
        stepper.set_e_position(-9);
        assert_eq!(stepper.position(Axis::E), -9);
        assert_eq!(stepper.position(Axis::X), 1);
    }
}
