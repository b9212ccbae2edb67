//! # tempmon
//!
//! A portable, no_std core for a real-time temperature telemetry monitor:
//! it parses temperature frames out of a raw byte stream, keeps a
//! median-filtered window of periodic ADC samples, and emits one report
//! line per fixed period on a drift-free, time-synchronized cadence.
//!
//! The crate implements only the stateful, concurrency-sensitive logic:
//! - a byte-at-a-time **frame parser** state machine, fed from the
//!   host's receive interrupt
//! - a single-slot **temperature store** shared between the byte-arrival
//!   context and the main loop, guarded with `critical-section`
//! - a fixed-capacity **sample window** with a snapshot-then-sort
//!   **median filter**
//! - a **scheduler** that advances due-times by period addition (never
//!   `now + period`), so the reporting cadence accumulates zero drift and
//!   survives tick-counter wraparound
//! - a debounced **run latch** driven by a control input
//!
//! Transport, ADC conversion, pin access, and the millisecond tick source
//! stay on the host side behind small traits ([`io::SampleSource`],
//! [`io::ReportSink`], [`io::Clock`]) and `embedded-hal`'s
//! [`InputPin`](embedded_hal::digital::InputPin).
//!
//! ## Crate features
//! | Feature      | Description |
//! |--------------|-------------|
//! | `std`        | Disables `#![no_std]`; used by the test suite |
//! | `delay-loop` | Blocking poll loop via `embedded_hal::delay::DelayNs` |
//! | `defmt-0-3`  | `defmt` formatting for public types |
//! | `log`        | `log` statements at main-loop sites |
//!
//! ## Usage
//!
//! The byte-arrival half runs in the host's receive ISR; the rest runs
//! from the main loop. Pin and interrupt wiring are platform specific:
//!
//! ```ignore
//! use tempmon::monitor::{Monitor, MonitorConfig, Receiver};
//! use tempmon::frame::FrameDescriptor;
//! use tempmon::store::{TempRange, TempStore};
//!
//! static STORE: TempStore = TempStore::new();
//! tempmon::init_receiver!();
//!
//! fn main() -> ! {
//!     let receiver = Receiver::new(
//!         FrameDescriptor::default(),
//!         Some(TempRange::default()),
//!         &STORE,
//!     )
//!     .unwrap();
//!     tempmon::setup_receiver!(receiver);
//!
//!     let mut monitor: Monitor<_, _, _> =
//!         Monitor::new(MonitorConfig::default(), &STORE, adc, button, uart_tx);
//!     monitor.init().unwrap();
//!     loop {
//!         let _ = monitor.poll(tick_ms());
//!     }
//! }
//!
//! #[interrupt]
//! fn USART1() {
//!     tempmon::feed_receiver!(read_data_register(), tick_ms());
//! }
//! ```
//!
//! ## Integration notes
//!
//! - [`Receiver::on_byte`](monitor::Receiver::on_byte) and
//!   [`Monitor::poll`](monitor::Monitor::poll) are both non-blocking and
//!   O(1) per call (the report path sorts the W-slot window copy).
//! - A garbled stream never needs intervention: any inconsistent byte
//!   silently resynchronizes the parser to the next frame header.
//! - Only one global receiver instance should be registered when using
//!   the interrupt macros.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use critical_section;

pub use heapless;

pub mod checksum;
pub mod consts;
pub mod control;
pub mod frame;
pub mod io;
pub mod monitor;
pub mod report;
pub mod sched;
pub mod store;
pub mod tick;
pub mod window;
