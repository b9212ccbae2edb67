//! Report line assembly.
//!
//! Formatting is a pure step: given the relative timestamp, the latest
//! reading (if any), and the window median, produce one complete text
//! line for the transport. Everything is fixed-point integer formatting;
//! no float math is involved.
//!
//! A missing reading renders as a placeholder instead of a number — zero
//! is a legitimate temperature and must never double as "no data".
//!
//! ```rust
//! use tempmon::report::format_line;
//! use tempmon::store::TemperatureReading;
//!
//! let reading = TemperatureReading { raw: 332, arrival_tick: 10 };
//! let line = format_line(250, Some(reading), 512);
//! assert_eq!(line.as_str(), "[0.25s] T:33.2 C, ADC:512\r\n");
//! ```

use core::fmt::Write;
use heapless::String;

use crate::consts::REPORT_LINE_CAP;
use crate::store::TemperatureReading;

/// Banner transmitted once at startup.
pub const READY_NOTICE: &str = "\r\n[System Ready] waiting for first valid frame\r\n";

/// Notice transmitted when the run latch toggles to running.
pub const START_NOTICE: &str = "-> START\r\n";

/// Notice transmitted when the run latch toggles to stopped.
pub const STOP_NOTICE: &str = "-> STOP\r\n";

/// Formats one report line: `[<time>s] T:<temp> C, ADC:<median>`.
///
/// The timestamp is signed seconds with two decimals; a report landing a
/// few ticks before the time base prints as `-0.00` rather than a huge
/// wrapped value. The temperature renders in tenths (`33.2`), or as
/// `--.-` while no reading has been accepted yet.
pub fn format_line(
    relative_ms: i32,
    reading: Option<TemperatureReading>,
    median: u16,
) -> String<REPORT_LINE_CAP> {
    let mut line = String::new();

    let ms = relative_ms.unsigned_abs();
    let sign = if relative_ms < 0 { "-" } else { "" };
    let _ = write!(line, "[{}{}.{:02}s] ", sign, ms / 1000, (ms % 1000) / 10);

    match reading {
        Some(reading) => {
            let _ = write!(line, "T:{}.{} C", reading.raw / 10, reading.raw % 10);
        }
        None => {
            let _ = line.push_str("T:--.- C");
        }
    }

    let _ = write!(line, ", ADC:{}\r\n", median);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(raw: u16) -> Option<TemperatureReading> {
        Some(TemperatureReading {
            raw,
            arrival_tick: 0,
        })
    }

    #[test]
    fn first_report_is_time_zero() {
        let line = format_line(0, reading(332), 512);
        assert_eq!(line.as_str(), "[0.00s] T:33.2 C, ADC:512\r\n");
    }

    #[test]
    fn second_report_is_one_period_in() {
        let line = format_line(250, reading(1000), 4095);
        assert_eq!(line.as_str(), "[0.25s] T:100.0 C, ADC:4095\r\n");
    }

    #[test]
    fn slightly_early_report_prints_small_negative() {
        let line = format_line(-3, reading(7), 0);
        assert_eq!(line.as_str(), "[-0.00s] T:0.7 C, ADC:0\r\n");
    }

    #[test]
    fn missing_reading_renders_placeholder_not_zero() {
        let line = format_line(500, None, 123);
        assert_eq!(line.as_str(), "[0.50s] T:--.- C, ADC:123\r\n");
    }

    #[test]
    fn widest_line_fits_the_buffer() {
        let line = format_line(i32::MIN, reading(u16::MAX), u16::MAX);
        assert_eq!(line.as_str(), "[-2147483.64s] T:6553.5 C, ADC:65535\r\n");
    }
}
