//! Collaborator interfaces the host implements over its HAL.
//!
//! The monitor core stays platform-free: analog conversion, line
//! transmission, and the millisecond tick source are thin host-side
//! wrappers behind these traits, the same way pin access goes through
//! `embedded_hal::digital`. `embedded-hal` 1.0 carries no ADC trait of
//! its own, so the sample source is defined here in the `nb` polling
//! style.

/// On-demand source of raw analog samples.
pub trait SampleSource {
    /// Conversion error reported by the hardware.
    type Error;

    /// Starts/polls one conversion and returns the raw sample.
    ///
    /// May return [`nb::Error::WouldBlock`] while a conversion is in
    /// flight; the monitor blocks on completion, so conversions must be
    /// bounded-time.
    fn read(&mut self) -> nb::Result<u16, Self::Error>;
}

/// Sink for complete, formatted report lines.
pub trait ReportSink {
    /// Transmission error reported by the transport.
    type Error;

    /// Transmits one complete line (terminator included).
    fn send_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

/// Monotonic millisecond tick source.
///
/// The counter may wrap at any power-of-two bound up to `u32`; all
/// due-time arithmetic in the crate is wraparound-safe.
pub trait Clock {
    /// Current tick count in milliseconds.
    fn now_ms(&mut self) -> u32;
}
