//! Tick-source integration and cadence helpers.
//!
//! The monitor core never owns a timer: the host feeds the current
//! millisecond tick into [`Monitor::poll`](crate::monitor::Monitor::poll)
//! and into the receive interrupt. This module carries the two ways to
//! wire that up, plus a compile-time cadence calculator:
//!
//! - `global_receiver_*`: static-singleton helpers for driving the
//!   [`Receiver`](crate::monitor::Receiver) from a receive ISR (see also
//!   the [`init_receiver!`](crate::init_receiver) macro family)
//! - `run_monitor_loop`: a blocking main loop over
//!   `embedded_hal::delay::DelayNs` (feature `delay-loop`)
//! - [`window_slots`]: derives the sample-window capacity from the two
//!   cadences
//!
//! Common cadences:
//!
//! | sample period | report period | window slots |
//! |---------------|---------------|--------------|
//! |         50 ms |        250 ms |            5 |
//! |         50 ms |        500 ms |           10 |
//! |        100 ms |        250 ms |            3 |

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg_attr(feature = "delay-loop", allow(unused_imports))]
#[cfg(feature = "delay-loop")]
pub use delay::*;

mod isr;
pub use isr::*;

mod macros;

/// Sample-window capacity covering one report period.
///
/// Rounds up so the window never covers less than a full report period
/// of samples.
///
/// ```rust
/// use tempmon::tick::window_slots;
///
/// const SLOTS: usize = window_slots(50, 250);
/// assert_eq!(SLOTS, 5);
/// ```
pub const fn window_slots(sample_period_ms: u32, report_period_ms: u32) -> usize {
    report_period_ms.div_ceil(sample_period_ms) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_one_report_period() {
        assert_eq!(window_slots(50, 250), 5);
        assert_eq!(window_slots(50, 500), 10);
    }

    #[test]
    fn uneven_cadences_round_up() {
        assert_eq!(window_slots(40, 250), 7);
        assert_eq!(window_slots(100, 250), 3);
    }
}
