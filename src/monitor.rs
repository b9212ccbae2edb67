//! Monitor run glue: the byte-arrival receiver and the main-loop driver.
//!
//! The monitor splits across the two execution contexts of the system:
//!
//! - [`Receiver`] belongs to the byte-arrival interrupt. It runs the
//!   frame parser, applies the range filter, and publishes accepted
//!   readings into the shared [`TempStore`].
//! - [`Monitor`] belongs to the cooperative main loop. It debounces the
//!   run control, picks up the time-base anchor, acquires ADC samples,
//!   and assembles and transmits report lines.
//!
//! The shared store is the only state both sides touch; everything else
//! is single-context and needs no locking.
//!
//! ## Example
//!
//! ```rust
//! # use core::convert::Infallible;
//! # use tempmon::io::{ReportSink, SampleSource};
//! # struct Adc;
//! # impl SampleSource for Adc {
//! #     type Error = Infallible;
//! #     fn read(&mut self) -> nb::Result<u16, Infallible> {
//! #         Ok(500)
//! #     }
//! # }
//! # struct Tx(Vec<String>);
//! # impl ReportSink for Tx {
//! #     type Error = Infallible;
//! #     fn send_line(&mut self, line: &str) -> Result<(), Infallible> {
//! #         self.0.push(line.into());
//! #         Ok(())
//! #     }
//! # }
//! # struct Button;
//! # impl embedded_hal::digital::ErrorType for Button {
//! #     type Error = Infallible;
//! # }
//! # impl embedded_hal::digital::InputPin for Button {
//! #     fn is_high(&mut self) -> Result<bool, Infallible> {
//! #         Ok(true)
//! #     }
//! #     fn is_low(&mut self) -> Result<bool, Infallible> {
//! #         Ok(false)
//! #     }
//! # }
//! use tempmon::frame::FrameDescriptor;
//! use tempmon::monitor::{Monitor, MonitorConfig, Receiver};
//! use tempmon::store::{TempRange, TempStore};
//!
//! let store = TempStore::new();
//! let mut receiver =
//!     Receiver::new(FrameDescriptor::default(), Some(TempRange::default()), &store).unwrap();
//! let mut monitor: Monitor<_, _, _> =
//!     Monitor::new(MonitorConfig::default(), &store, Adc, Button, Tx(Vec::new()));
//! monitor.init().unwrap();
//!
//! // The receive interrupt feeds bytes; tick 10 is the arrival time.
//! for byte in [0xFC, 0x0A, 0x00, 0x01, 0x4C, 0x01, 0, 0, 0, 0] {
//!     receiver.on_byte(byte, 10);
//! }
//!
//! // Main loop polls: anchored at tick 10, first report lands at 260.
//! for now in [10, 60, 110, 160, 210, 260] {
//!     let _ = monitor.poll(now).unwrap();
//! }
//! assert_eq!(monitor.sink.0.last().unwrap(), "[0.00s] T:33.2 C, ADC:500\r\n");
//! ```

use embedded_hal::digital::InputPin;
use nb::block;
use thiserror::Error;

use crate::consts::{DEBOUNCE_MS, REPORT_PERIOD_MS, SAMPLE_PERIOD_MS, WINDOW_SLOTS};
use crate::control::{RunControl, RunEvent};
use crate::frame::{DescriptorError, FrameDescriptor, FrameParser};
use crate::io::{ReportSink, SampleSource};
use crate::report;
use crate::sched::Scheduler;
use crate::store::{TempRange, TempStore, TemperatureReading};
use crate::window::SampleWindow;

/// Whether the analog channel keeps sampling while reporting is stopped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum SamplePolicy {
    /// Sample on cadence regardless of the run latch.
    Always,
    /// Gate sampling on the run latch along with reporting.
    #[default]
    WhileRunning,
}

/// Main-loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Period between ADC sample acquisitions, in ms.
    pub sample_period_ms: u32,
    /// Period between report lines, in ms.
    pub report_period_ms: u32,
    /// Run-control debounce confirmation delay, in ms.
    pub debounce_ms: u32,
    /// Whether the control input is active-low.
    pub control_active_low: bool,
    /// Sampling behavior while stopped.
    pub sample_policy: SamplePolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: SAMPLE_PERIOD_MS,
            report_period_ms: REPORT_PERIOD_MS,
            debounce_ms: DEBOUNCE_MS,
            control_active_low: true,
            sample_policy: SamplePolicy::default(),
        }
    }
}

/// A collaborator failure surfaced from the main loop.
///
/// The core's own state is never corrupted by one of these: a failed
/// acquisition skips that sample, a failed transmit drops that line, and
/// the cadence continues on the next poll.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError<A, S> {
    /// Analog sample acquisition failed.
    #[error("sample acquisition failed")]
    Adc(A),
    /// Report transmission failed.
    #[error("report transmission failed")]
    Sink(S),
}

/// What one main-loop poll did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    /// Confirmed run-latch transition, if any.
    pub run_event: Option<RunEvent>,
    /// A sample was acquired and pushed into the window.
    pub sampled: bool,
    /// A report line was assembled and transmitted.
    pub reported: bool,
}

/// Byte-arrival half of the monitor.
///
/// Owned by the receive-interrupt context. Feed every received byte via
/// [`on_byte`](Receiver::on_byte); map transport faults (overrun, noise,
/// framing errors) to [`on_transport_fault`](Receiver::on_transport_fault).
#[derive(Debug)]
pub struct Receiver<'a> {
    /// Byte-level frame state machine.
    pub parser: FrameParser,
    store: &'a TempStore,
    range: Option<TempRange>,

    /// Readings dropped by the range filter.
    pub out_of_range: u16,
}

impl<'a> Receiver<'a> {
    /// Creates the receive half over the shared store.
    ///
    /// `range` is the optional validity band; `None` accepts every
    /// decoded reading.
    pub fn new(
        descriptor: FrameDescriptor,
        range: Option<TempRange>,
        store: &'a TempStore,
    ) -> Result<Self, DescriptorError> {
        Ok(Self {
            parser: FrameParser::new(descriptor)?,
            store,
            range,
            out_of_range: 0,
        })
    }

    /// Consumes one received byte; `now` is the current millisecond tick.
    ///
    /// On a fully validated frame the reading passes the range filter,
    /// lands in the store, and — for the first acceptance of a run —
    /// records the time-base anchor. Out-of-range readings are dropped
    /// without touching the store.
    pub fn on_byte(&mut self, byte: u8, now: u32) {
        if let Some(raw) = self.parser.feed(byte) {
            if let Some(range) = self.range {
                if !range.contains(raw) {
                    self.out_of_range = self.out_of_range.wrapping_add(1);
                    return;
                }
            }
            self.store.publish(TemperatureReading {
                raw,
                arrival_tick: now,
            });
        }
    }

    /// Recovers from a transport fault by dropping any partial frame.
    pub fn on_transport_fault(&mut self) {
        self.parser.resync();
    }
}

/// Main-loop half of the monitor.
///
/// Call [`poll`](Monitor::poll) from the cooperative main loop with the
/// current millisecond tick; every call is non-blocking and bounded.
#[derive(Debug)]
pub struct Monitor<'a, ADC, BTN, SINK, const W: usize = WINDOW_SLOTS>
where
    ADC: SampleSource,
    BTN: InputPin,
    SINK: ReportSink,
{
    store: &'a TempStore,
    control: RunControl<BTN>,
    window: SampleWindow<W>,
    sched: Scheduler,
    policy: SamplePolicy,

    /// ADC collaborator.
    pub adc: ADC,

    /// Transport collaborator for outgoing lines.
    pub sink: SINK,

    /// Report lines transmitted since construction.
    pub reports: u16,
}

impl<'a, ADC, BTN, SINK, const W: usize> Monitor<'a, ADC, BTN, SINK, W>
where
    ADC: SampleSource,
    BTN: InputPin,
    SINK: ReportSink,
{
    /// Creates the main-loop half over the shared store.
    pub fn new(config: MonitorConfig, store: &'a TempStore, adc: ADC, control: BTN, sink: SINK) -> Self {
        Self {
            store,
            control: RunControl::new(control, config.control_active_low, config.debounce_ms),
            window: SampleWindow::new(),
            sched: Scheduler::new(config.sample_period_ms, config.report_period_ms),
            policy: config.sample_policy,
            adc,
            sink,
            reports: 0,
        }
    }

    /// One-time startup: seeds the sample window with an immediate real
    /// sample and transmits the ready banner.
    pub fn init(&mut self) -> Result<(), MonitorError<ADC::Error, SINK::Error>> {
        let seed = block!(self.adc.read()).map_err(MonitorError::Adc)?;
        self.window.prime(seed);
        self.sink
            .send_line(report::READY_NOTICE)
            .map_err(MonitorError::Sink)?;
        Ok(())
    }

    /// Current run-latch state.
    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }

    /// Whether the report time base is currently established.
    pub fn is_synchronized(&self) -> bool {
        self.sched.is_synchronized()
    }

    fn sampling_enabled(&self) -> bool {
        match self.policy {
            SamplePolicy::Always => true,
            SamplePolicy::WhileRunning => self.control.is_running(),
        }
    }

    /// Runs one main-loop iteration at tick `now`.
    ///
    /// Handles, in order: the run control, time-base anchoring, sample
    /// acquisition, and report assembly. Collaborator failures surface
    /// as [`MonitorError`]; the schedule itself is unaffected by them.
    pub fn poll(&mut self, now: u32) -> Result<Activity, MonitorError<ADC::Error, SINK::Error>> {
        let mut activity = Activity::default();

        if let Some(event) = self.control.poll(now) {
            activity.run_event = Some(event);
            match event {
                RunEvent::Started => {
                    // A fresh run gets a fresh time base from the next
                    // accepted reading.
                    self.sched.desynchronize();
                    self.store.arm_sync();
                    self.sink
                        .send_line(report::START_NOTICE)
                        .map_err(MonitorError::Sink)?;
                }
                RunEvent::Stopped => {
                    self.sink
                        .send_line(report::STOP_NOTICE)
                        .map_err(MonitorError::Sink)?;
                }
            }
            #[cfg(feature = "log")]
            log::info!(
                "run latch toggled: {}",
                if self.control.is_running() { "start" } else { "stop" }
            );
        }

        if !self.sched.is_synchronized() {
            if let Some(anchor) = self.store.take_anchor() {
                self.sched.synchronize(anchor);
                #[cfg(feature = "log")]
                log::debug!("time base anchored at tick {}", anchor);
            }
        }

        let dispatch = self.sched.poll(now);

        if dispatch.sample_due && self.sampling_enabled() {
            let sample = block!(self.adc.read()).map_err(MonitorError::Adc)?;
            self.window.push(sample);
            activity.sampled = true;
        }

        if let Some(relative_ms) = dispatch.report_due {
            if self.control.is_running() {
                let line =
                    report::format_line(relative_ms, self.store.latest(), self.window.median());
                self.sink.send_line(&line).map_err(MonitorError::Sink)?;
                self.reports = self.reports.wrapping_add(1);
                activity.reported = true;
            }
        }

        Ok(activity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;

    struct FakeAdc(u16);

    impl SampleSource for FakeAdc {
        type Error = Infallible;

        fn read(&mut self) -> nb::Result<u16, Infallible> {
            Ok(self.0)
        }
    }

    struct FakeSink {
        lines: Vec<String>,
    }

    impl FakeSink {
        fn new() -> Self {
            Self { lines: Vec::new() }
        }
    }

    impl ReportSink for FakeSink {
        type Error = Infallible;

        fn send_line(&mut self, line: &str) -> Result<(), Infallible> {
            self.lines.push(line.to_string());
            Ok(())
        }
    }

    /// Active-low control line; `true` means pressed.
    struct FakePin<'a>(&'a Cell<bool>);

    impl embedded_hal::digital::ErrorType for FakePin<'_> {
        type Error = Infallible;
    }

    impl InputPin for FakePin<'_> {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }
    }

    fn device_frame(raw: u16) -> [u8; 10] {
        let [lo, hi] = raw.to_le_bytes();
        [0xFC, 0x0A, 0x00, 0x01, lo, hi, 0x00, 0x00, 0x00, 0x00]
    }

    fn feed_frame(receiver: &mut Receiver<'_>, raw: u16, now: u32) {
        for byte in device_frame(raw) {
            receiver.on_byte(byte, now);
        }
    }

    fn monitor<'a>(
        store: &'a TempStore,
        pressed: &'a Cell<bool>,
    ) -> Monitor<'a, FakeAdc, FakePin<'a>, FakeSink> {
        Monitor::new(
            MonitorConfig::default(),
            store,
            FakeAdc(500),
            FakePin(pressed),
            FakeSink::new(),
        )
    }

    #[test]
    fn first_report_is_relative_time_zero() {
        let store = TempStore::new();
        let pressed = Cell::new(false);
        let mut receiver =
            Receiver::new(FrameDescriptor::default(), Some(TempRange::default()), &store).unwrap();
        let mut mon = monitor(&store, &pressed);

        mon.init().unwrap();
        assert_eq!(mon.sink.lines[0], report::READY_NOTICE);
        assert!(!mon.is_synchronized());

        feed_frame(&mut receiver, 332, 10);
        let first = mon.poll(10).unwrap();
        assert!(mon.is_synchronized());
        assert!(first.sampled);
        assert!(!first.reported);

        for now in [60, 110, 160, 210] {
            assert!(mon.poll(now).unwrap().sampled);
        }

        let report_poll = mon.poll(260).unwrap();
        assert!(report_poll.reported);
        assert_eq!(mon.sink.lines.last().unwrap(), "[0.00s] T:33.2 C, ADC:500\r\n");

        // One period later the stamp advances by exactly one period.
        let second = mon.poll(510).unwrap();
        assert!(second.reported);
        assert_eq!(mon.sink.lines.last().unwrap(), "[0.25s] T:33.2 C, ADC:500\r\n");
        assert_eq!(mon.reports, 2);
    }

    #[test]
    fn stop_and_restart_reanchors_relative_time() {
        let store = TempStore::new();
        let pressed = Cell::new(false);
        let mut receiver =
            Receiver::new(FrameDescriptor::default(), Some(TempRange::default()), &store).unwrap();
        let mut mon = monitor(&store, &pressed);
        mon.init().unwrap();

        feed_frame(&mut receiver, 332, 10);
        let _ = mon.poll(10).unwrap();
        assert!(mon.poll(260).unwrap().reported);

        // Press: candidate edge, then confirmation one debounce later.
        pressed.set(true);
        assert_eq!(mon.poll(261).unwrap().run_event, None);
        let stopped = mon.poll(281).unwrap();
        assert_eq!(stopped.run_event, Some(RunEvent::Stopped));
        assert_eq!(mon.sink.lines.last().unwrap(), report::STOP_NOTICE);

        // Stopped: the report due-time passes without a transmission.
        let gated = mon.poll(510).unwrap();
        assert!(!gated.reported);
        assert_eq!(mon.sink.lines.last().unwrap(), report::STOP_NOTICE);

        // Release, press again: back to running with the time base
        // discarded.
        pressed.set(false);
        let _ = mon.poll(520).unwrap();
        pressed.set(true);
        let _ = mon.poll(530).unwrap();
        let started = mon.poll(550).unwrap();
        assert_eq!(started.run_event, Some(RunEvent::Started));
        assert_eq!(mon.sink.lines.last().unwrap(), report::START_NOTICE);
        assert!(!mon.is_synchronized());

        // The next accepted reading anchors a fresh time base.
        feed_frame(&mut receiver, 340, 1000);
        assert!(mon.poll(1000).unwrap().sampled);
        let reanchored = mon.poll(1250).unwrap();
        assert!(reanchored.reported);
        assert_eq!(mon.sink.lines.last().unwrap(), "[0.00s] T:34.0 C, ADC:500\r\n");
    }

    #[test]
    fn sampling_continues_while_stopped_under_always_policy() {
        let store = TempStore::new();
        let pressed = Cell::new(false);
        let mut receiver =
            Receiver::new(FrameDescriptor::default(), Some(TempRange::default()), &store).unwrap();
        let config = MonitorConfig {
            sample_policy: SamplePolicy::Always,
            ..MonitorConfig::default()
        };
        let mut mon: Monitor<'_, _, _, _> =
            Monitor::new(config, &store, FakeAdc(500), FakePin(&pressed), FakeSink::new());
        mon.init().unwrap();

        feed_frame(&mut receiver, 332, 0);
        let _ = mon.poll(0).unwrap();

        pressed.set(true);
        let _ = mon.poll(10).unwrap();
        assert_eq!(mon.poll(30).unwrap().run_event, Some(RunEvent::Stopped));

        // Sample cadence keeps firing; reports stay gated.
        let tick = mon.poll(50).unwrap();
        assert!(tick.sampled);
        assert!(!mon.poll(250).unwrap().reported);
    }

    #[test]
    fn out_of_range_reading_neither_stores_nor_anchors() {
        let store = TempStore::new();
        let mut receiver =
            Receiver::new(FrameDescriptor::default(), Some(TempRange::default()), &store).unwrap();

        feed_frame(&mut receiver, 1001, 10);
        assert_eq!(store.latest(), None);
        assert_eq!(store.take_anchor(), None);
        assert_eq!(receiver.out_of_range, 1);

        // Boundary values are inside the band.
        feed_frame(&mut receiver, 1000, 20);
        assert_eq!(store.take_anchor(), Some(20));
        feed_frame(&mut receiver, 0, 30);
        assert_eq!(store.latest().unwrap().raw, 0);
        assert_eq!(receiver.out_of_range, 1);
    }

    #[test]
    fn transport_fault_recovers_like_a_bad_byte() {
        let store = TempStore::new();
        let mut receiver = Receiver::new(FrameDescriptor::default(), None, &store).unwrap();

        // Half a frame arrives, then the UART reports an overrun.
        for byte in &device_frame(332)[..5] {
            receiver.on_byte(*byte, 10);
        }
        receiver.on_transport_fault();

        // The stale tail is ignored; the next frame parses cleanly.
        for byte in &device_frame(332)[5..] {
            receiver.on_byte(*byte, 11);
        }
        assert_eq!(store.latest(), None);
        feed_frame(&mut receiver, 451, 40);
        assert_eq!(store.latest().unwrap().raw, 451);
    }
}
