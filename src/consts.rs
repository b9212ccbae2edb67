//! Constants used across the monitor implementation.
//!
//! This module defines the protocol bytes, cadences, and filter bounds
//! the monitor is built for. They match the telemetry source the crate
//! was written against; a different device revision only needs this
//! module (and possibly a [`FrameDescriptor`](crate::frame::FrameDescriptor))
//! adjusted.
//!
//! ## Key Concepts
//!
//! - **Frame prefix**: a fixed header byte opens every frame; the default
//!   descriptor expects a two-byte little-endian length and a command
//!   selector behind it.
//! - **Cadences**: the ADC is sampled every [`SAMPLE_PERIOD_MS`] and one
//!   report line is emitted every [`REPORT_PERIOD_MS`]; the window size
//!   is derived so one report covers one full window of samples.
//! - **Range filter**: readings outside the valid band are discarded
//!   without touching the last accepted reading.

/// Header byte that opens every telemetry frame.
pub const FRAME_HEADER: u8 = 0xFC;

/// Command selector identifying a temperature payload.
pub const TEMP_COMMAND: u8 = 0x01;

/// Payload width (in bytes) of a temperature frame.
///
/// The reading occupies the first two bytes, little-endian, in tenths of
/// a degree; the remainder is padding the device always sends.
pub const TEMP_PAYLOAD_LEN: u8 = 6;

/// Period (in ms) between two ADC sample acquisitions.
pub const SAMPLE_PERIOD_MS: u32 = 50;

/// Period (in ms) between two report lines.
pub const REPORT_PERIOD_MS: u32 = 250;

/// Capacity of the sample window.
///
/// Sized so the samples taken during one report period fill the window
/// exactly; the median therefore describes the last report interval.
pub const WINDOW_SLOTS: usize = crate::tick::window_slots(SAMPLE_PERIOD_MS, REPORT_PERIOD_MS);

/// Lower bound of the valid temperature band, in tenths of a degree.
pub const TEMP_MIN_TENTHS: u16 = 0;

/// Upper bound of the valid temperature band, in tenths of a degree.
pub const TEMP_MAX_TENTHS: u16 = 1000;

/// Confirmation delay (in ms) for the run-control input debounce.
pub const DEBOUNCE_MS: u32 = 20;

/// Capacity of the formatted report line buffer.
///
/// Large enough for the widest representable line
/// (`[-2147483.64s] T:6553.5 C, ADC:65535`).
pub const REPORT_LINE_CAP: usize = 48;
