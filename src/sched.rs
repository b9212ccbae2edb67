//! Drift-free periodic dispatch and time-base synchronization.
//!
//! The scheduler tracks two independent cadences (sample acquisition and
//! reporting) as absolute due-ticks. A due-time only ever advances by
//! adding its period to the *previous* due-time — never by `now +
//! period` — so the cadence accumulates zero drift no matter how much
//! jitter the host loop adds to individual polls. The one exception is
//! starvation: when the host loop falls more than a full period behind,
//! the due-time re-anchors to `now + period` instead of scheduling a
//! burst of catch-up actions.
//!
//! Report timestamps are relative to a time base anchored on the first
//! validated reading of a run. The base is placed one report period
//! *after* the anchor tick, so the first report (due exactly one period
//! after the reading arrived) is labeled `0.00s`.
//!
//! All comparisons go through wrapping subtraction, so due-times stay
//! correct when the millisecond counter wraps.

use crate::consts::{REPORT_PERIOD_MS, SAMPLE_PERIOD_MS};

/// True once `now` has reached or passed `due`, under wraparound.
pub(crate) fn deadline_reached(now: u32, due: u32) -> bool {
    now.wrapping_sub(due) as i32 >= 0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    /// No time base yet; due-times are meaningless and nothing fires.
    Unsynchronized,
    /// Anchored; both cadences are live.
    Synchronized {
        next_sample_due: u32,
        next_report_due: u32,
        time_base: u32,
    },
}

/// Actions a scheduler poll found due.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// One sample acquisition is due.
    pub sample_due: bool,
    /// One report is due, carrying the signed relative timestamp in
    /// milliseconds. Signed so a report a tick early prints as a small
    /// negative rather than wrapping.
    pub report_due: Option<i32>,
}

/// Due-time tracker for the sampling and reporting cadences.
#[derive(Debug, Clone)]
pub struct Scheduler {
    sample_period_ms: u32,
    report_period_ms: u32,
    state: SyncState,
}

impl Scheduler {
    /// Creates an unsynchronized scheduler with the given periods.
    pub const fn new(sample_period_ms: u32, report_period_ms: u32) -> Self {
        Self {
            sample_period_ms,
            report_period_ms,
            state: SyncState::Unsynchronized,
        }
    }

    /// Whether a time base is currently established.
    pub fn is_synchronized(&self) -> bool {
        matches!(self.state, SyncState::Synchronized { .. })
    }

    /// Establishes the time base from the anchor tick (the arrival of
    /// the first validated reading of this run).
    ///
    /// Sampling is due immediately; the first report is due one report
    /// period later and is labeled relative time zero.
    pub fn synchronize(&mut self, anchor_tick: u32) {
        self.state = SyncState::Synchronized {
            next_sample_due: anchor_tick,
            next_report_due: anchor_tick.wrapping_add(self.report_period_ms),
            time_base: anchor_tick.wrapping_add(self.report_period_ms),
        };
    }

    /// Discards the time base; nothing fires until the next
    /// [`synchronize`](Scheduler::synchronize).
    pub fn desynchronize(&mut self) {
        self.state = SyncState::Unsynchronized;
    }

    /// Advances the due-time bookkeeping to `now`.
    ///
    /// At most one sample and one report come due per poll; a starved
    /// backlog collapses into a single action with the due-time
    /// re-anchored one period past `now`.
    pub fn poll(&mut self, now: u32) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let SyncState::Synchronized {
            mut next_sample_due,
            mut next_report_due,
            time_base,
        } = self.state
        else {
            return dispatch;
        };

        if deadline_reached(now, next_sample_due) {
            dispatch.sample_due = true;
            next_sample_due = next_sample_due.wrapping_add(self.sample_period_ms);
            if deadline_reached(now, next_sample_due) {
                next_sample_due = now.wrapping_add(self.sample_period_ms);
            }
        }

        if deadline_reached(now, next_report_due) {
            dispatch.report_due = Some(now.wrapping_sub(time_base) as i32);
            next_report_due = next_report_due.wrapping_add(self.report_period_ms);
            if deadline_reached(now, next_report_due) {
                next_report_due = now.wrapping_add(self.report_period_ms);
            }
        }

        self.state = SyncState::Synchronized {
            next_sample_due,
            next_report_due,
            time_base,
        };
        dispatch
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SAMPLE_PERIOD_MS, REPORT_PERIOD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsynchronized_dispatches_nothing() {
        let mut sched = Scheduler::default();
        assert_eq!(sched.poll(0), Dispatch::default());
        assert_eq!(sched.poll(10_000), Dispatch::default());
    }

    #[test]
    fn anchor_samples_immediately_and_reports_one_period_later() {
        let mut sched = Scheduler::default();
        sched.synchronize(100);

        let first = sched.poll(100);
        assert!(first.sample_due);
        assert_eq!(first.report_due, None);

        assert!(!sched.poll(149).sample_due);
        assert!(sched.poll(150).sample_due);

        assert_eq!(sched.poll(349).report_due, None);
        assert_eq!(sched.poll(350).report_due, Some(0));
    }

    #[test]
    fn report_cadence_does_not_drift_under_jitter() {
        let mut sched = Scheduler::default();
        sched.synchronize(0);

        for k in 1u32..=8 {
            let due = 250 * k;
            let jitter = k % 3;
            // Not due one tick early, even after jittered firings.
            assert_eq!(sched.poll(due - 1).report_due, None);
            let fired = sched.poll(due + jitter);
            assert_eq!(fired.report_due, Some((250 * (k - 1) + jitter) as i32));
        }
    }

    #[test]
    fn starved_backlog_collapses_to_one_action() {
        let mut sched = Scheduler::default();
        sched.synchronize(0);

        // The host loop stalls past four report periods.
        let late = sched.poll(1300);
        assert!(late.sample_due);
        assert_eq!(late.report_due, Some(1050));

        // No catch-up burst: next actions are a full period out.
        let after = sched.poll(1301);
        assert!(!after.sample_due);
        assert_eq!(after.report_due, None);
        assert!(sched.poll(1350).sample_due);
        assert_eq!(sched.poll(1550).report_due, Some(1300));
    }

    #[test]
    fn due_times_stay_correct_across_tick_wraparound() {
        let mut sched = Scheduler::default();
        let anchor = u32::MAX - 100;
        sched.synchronize(anchor);

        assert!(sched.poll(anchor).sample_due);
        // The next sample due-time has wrapped past zero.
        assert!(!sched.poll(anchor.wrapping_add(49)).sample_due);
        assert!(sched.poll(anchor.wrapping_add(50)).sample_due);

        let report = sched.poll(anchor.wrapping_add(250));
        assert_eq!(report.report_due, Some(0));
    }

    #[test]
    fn relative_time_reflects_the_actual_poll_tick() {
        let mut sched = Scheduler::default();
        sched.synchronize(1000);
        // A report fired 3 ms late is stamped 3 ms late; the due-time
        // itself stays on the exact cadence.
        assert_eq!(sched.poll(1253).report_due, Some(3));
        assert_eq!(sched.poll(1500).report_due, Some(250));
    }
}
