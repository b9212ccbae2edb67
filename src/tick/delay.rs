use crate::io::{Clock, ReportSink, SampleSource};
use crate::monitor::Monitor;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

/// Runs a blocking main loop that repeatedly polls the monitor.
///
/// For single-purpose firmware with no other main-loop work: polls the
/// monitor, then sleeps `poll_interval_ms` via the HAL's delay provider.
/// A 1 ms interval is plenty; the cadences are tracked in absolute
/// due-ticks, so poll jitter never accumulates into drift.
///
/// Collaborator errors surfaced by a poll are dropped here — the
/// schedule self-heals on the next iteration. Hosts that need to see
/// them should run their own loop over
/// [`Monitor::poll`](crate::monitor::Monitor::poll).
///
/// # Example
/// ```ignore
/// let mut monitor: Monitor<_, _, _> =
///     Monitor::new(MonitorConfig::default(), &STORE, adc, button, uart_tx);
/// monitor.init().unwrap();
/// run_monitor_loop(&mut monitor, &mut clock, &mut delay, 1);
/// ```
pub fn run_monitor_loop<C, D, ADC, BTN, SINK, const W: usize>(
    monitor: &mut Monitor<'_, ADC, BTN, SINK, W>,
    clock: &mut C,
    delay: &mut D,
    poll_interval_ms: u32,
) where
    C: Clock,
    D: DelayNs,
    ADC: SampleSource,
    BTN: InputPin,
    SINK: ReportSink,
{
    loop {
        let _ = monitor.poll(clock.now_ms());
        delay.delay_ms(poll_interval_ms);
    }
}
