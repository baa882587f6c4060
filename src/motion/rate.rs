//! Step-rate to timer-interval conversion
//!
//! The interrupt cannot afford a 16x16 divide on every tick, so step rates
//! are converted to timer compare values through a pair of compile-time
//! generated lookup tables with linear interpolation between entries: a
//! "fast" table indexed by the high byte of the rate and a "slow" table with
//! 8 Hz spacing for the low range. The tables are generated for a 16 MHz
//! clock with a /8 prescaler; regenerate the constants below if either
//! changes.

/// Step timer tick rate: 16 MHz clock divided by the /8 prescaler.
pub const STEP_TIMER_HZ: u32 = 2_000_000;

/// Upper bound on requested step rates.
pub const MAX_STEP_FREQUENCY: u32 = 40_000;

/// Shortest interval the interrupt can sustain (about 20 kHz).
pub const MIN_TIMER_INTERVAL: u16 = 100;

/// Minimum-rate floor subtracted before table lookup (`F_CPU / 500_000`).
const RATE_FLOOR: u32 = 32;

/// Scaled rates at or above this use the fast table.
const FAST_THRESHOLD: u32 = 2048;

/// A programmed timer interval together with the pulse multiplier that goes
/// with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepInterval {
    /// Timer compare value in 2 MHz ticks.
    pub ticks: u16,
    /// Step events to execute per timer tick (1, 2, or 4).
    pub loops: u8,
    /// The interval hit [`MIN_TIMER_INTERVAL`] and was clamped.
    pub clamped: bool,
}

const fn interval_at(rate: u32) -> u16 {
    (STEP_TIMER_HZ / rate) as u16
}

/// Fast range: entry `i` holds the interval at rate `i * 256 + RATE_FLOOR`
/// and the drop to the next entry.
const fn fast_table() -> [(u16, u16); 256] {
    let mut table = [(0u16, 0u16); 256];
    let mut i = 0;
    while i < 256 {
        let rate = i as u32 * 256 + RATE_FLOOR;
        let base = interval_at(rate);
        let gain = base - interval_at(rate + 256);
        table[i] = (base, gain);
        i += 1;
    }
    table
}

/// Slow range: 8 Hz spacing, interpolated with the low three bits.
const fn slow_table() -> [(u16, u16); 256] {
    let mut table = [(0u16, 0u16); 256];
    let mut i = 0;
    while i < 256 {
        let rate = i as u32 * 8 + RATE_FLOOR;
        let base = interval_at(rate);
        let gain = base - interval_at(rate + 8);
        table[i] = (base, gain);
        i += 1;
    }
    table
}

static FAST_TABLE: [(u16, u16); 256] = fast_table();
static SLOW_TABLE: [(u16, u16); 256] = slow_table();

/// Convert a step rate to the timer interval that produces it.
///
/// Rates above 10 kHz (20 kHz) are halved (quartered) and compensated with a
/// pulse multiplier of 2 (4), so the timer itself never has to fire above
/// 20 kHz. An interval below [`MIN_TIMER_INTERVAL`] is clamped and flagged.
pub fn calc_timer(step_rate: u32) -> StepInterval {
    let mut rate = step_rate.min(MAX_STEP_FREQUENCY);

    let loops = if rate > 20_000 {
        rate >>= 2;
        4
    } else if rate > 10_000 {
        rate >>= 1;
        2
    } else {
        1
    };

    if rate < RATE_FLOOR {
        rate = RATE_FLOOR;
    }
    let scaled = rate - RATE_FLOOR;

    let mut ticks = if scaled >= FAST_THRESHOLD {
        let (base, gain) = FAST_TABLE[(scaled >> 8) as usize];
        base - ((((scaled & 0xff) * gain as u32) >> 8) as u16)
    } else {
        let (base, gain) = SLOW_TABLE[(scaled >> 3) as usize];
        base - (((gain as u32 * (scaled & 0x07)) >> 3) as u16)
    };

    let clamped = ticks < MIN_TIMER_INTERVAL;
    if clamped {
        ticks = MIN_TIMER_INTERVAL;
    }

    StepInterval {
        ticks,
        loops,
        clamped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_table_points() {
        // Rates landing exactly on a table entry come out as a plain divide.
        assert_eq!(calc_timer(1000).ticks, 2000);
        assert_eq!(calc_timer(500).ticks, 4000);
        assert_eq!(calc_timer(4000).ticks, 500);
    }

    #[test]
    fn test_interpolation_accuracy() {
        // Across the whole single-loop range the table stays within 1% of
        // the exact division.
        for rate in (100..=10_000).step_by(7) {
            let ticks = calc_timer(rate).ticks as i64;
            let exact = (STEP_TIMER_HZ / rate) as i64;
            let err = (ticks - exact).abs();
            assert!(
                err * 100 <= exact,
                "rate {} -> {} ticks, exact {}",
                rate,
                ticks,
                exact
            );
        }
    }

    #[test]
    fn test_timer_floor() {
        for rate in (0..=100_000).step_by(13) {
            assert!(calc_timer(rate).ticks >= MIN_TIMER_INTERVAL);
        }
    }

    #[test]
    fn test_loop_selection() {
        assert_eq!(calc_timer(5_000).loops, 1);
        assert_eq!(calc_timer(10_000).loops, 1);
        assert_eq!(calc_timer(10_001).loops, 2);
        assert_eq!(calc_timer(20_000).loops, 2);
        assert_eq!(calc_timer(20_001).loops, 4);
        assert_eq!(calc_timer(40_000).loops, 4);
        // Clamped to MAX_STEP_FREQUENCY first.
        assert_eq!(calc_timer(90_000).loops, 4);
    }

    #[test]
    fn test_loops_consistency() {
        // If loops = k the requested rate never exceeded 20k * k.
        for rate in (1..=60_000).step_by(11) {
            let interval = calc_timer(rate);
            let capped = rate.min(MAX_STEP_FREQUENCY);
            assert!(capped <= 20_000 * interval.loops as u32);
        }
    }

    #[test]
    fn test_monotonic_intervals() {
        // Within one loop band, higher rate never yields a longer interval.
        let mut last = u16::MAX;
        for rate in 32..=10_000 {
            let ticks = calc_timer(rate).ticks;
            assert!(ticks <= last, "rate {} regressed", rate);
            last = ticks;
        }
    }

    #[test]
    fn test_zero_rate_clamps_to_floor() {
        let interval = calc_timer(0);
        assert_eq!(interval.loops, 1);
        assert_eq!(interval.ticks, 62_500);
        assert!(!interval.clamped);
    }
}
