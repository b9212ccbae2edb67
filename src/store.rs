//! Validated readings and the cross-context temperature store.
//!
//! The store is the single piece of state shared between the byte-arrival
//! interrupt (which publishes readings) and the main loop (which reads
//! them and picks up the time-base anchor). Every access is a short
//! `critical_section::with` block over a `Copy` snapshot, so neither side
//! ever blocks the other for more than a handful of loads and stores.

use core::cell::Cell;
use core::fmt;
use critical_section::Mutex;

use crate::consts::{TEMP_MAX_TENTHS, TEMP_MIN_TENTHS};

/// One validated temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TemperatureReading {
    /// Raw value in tenths of a degree.
    pub raw: u16,
    /// Millisecond tick at which the frame completed.
    pub arrival_tick: u32,
}

impl TemperatureReading {
    /// The reading in degrees.
    pub fn celsius(&self) -> f32 {
        f32::from(self.raw) / 10.0
    }
}

/// Inclusive band of acceptable readings, in tenths of a degree.
///
/// Comparing in tenths keeps the boundary exact: a reading of precisely
/// `max_tenths` is accepted, one tenth beyond is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TempRange {
    /// Lowest accepted value.
    pub min_tenths: u16,
    /// Highest accepted value.
    pub max_tenths: u16,
}

impl TempRange {
    /// Creates a band from inclusive bounds.
    pub const fn new(min_tenths: u16, max_tenths: u16) -> Self {
        Self {
            min_tenths,
            max_tenths,
        }
    }

    /// Whether a raw reading lies inside the band.
    pub const fn contains(&self, tenths: u16) -> bool {
        tenths >= self.min_tenths && tenths <= self.max_tenths
    }
}

impl Default for TempRange {
    fn default() -> Self {
        Self::new(TEMP_MIN_TENTHS, TEMP_MAX_TENTHS)
    }
}

#[derive(Clone, Copy)]
struct Shared {
    reading: Option<TemperatureReading>,
    /// Set while the next accepted reading should capture the time-base
    /// anchor.
    sync_armed: bool,
    anchor: Option<u32>,
}

/// Single-slot reading store shared across the interrupt boundary.
///
/// The byte-arrival side overwrites the slot on every accepted reading
/// via [`publish`](TempStore::publish); the main loop reads the latest
/// value with [`latest`](TempStore::latest). The store also carries the
/// one-shot synchronization handshake: the main loop arms it on each
/// run-start ([`arm_sync`](TempStore::arm_sync)), the first reading
/// published while armed records its arrival tick, and the main loop
/// collects that tick once with [`take_anchor`](TempStore::take_anchor).
///
/// Constructible in a `static`:
///
/// ```rust
/// use tempmon::store::TempStore;
///
/// static STORE: TempStore = TempStore::new();
/// ```
pub struct TempStore {
    shared: Mutex<Cell<Shared>>,
}

impl TempStore {
    /// Creates an empty store, armed so the first published reading
    /// anchors the time base.
    pub const fn new() -> Self {
        Self {
            shared: Mutex::new(Cell::new(Shared {
                reading: None,
                sync_armed: true,
                anchor: None,
            })),
        }
    }

    /// Stores a reading, superseding the previous one.
    ///
    /// Called from the byte-arrival context. If the store is armed for
    /// synchronization, the reading's arrival tick becomes the pending
    /// anchor and the armed flag clears.
    pub fn publish(&self, reading: TemperatureReading) {
        critical_section::with(|cs| {
            let cell = self.shared.borrow(cs);
            let mut shared = cell.get();
            shared.reading = Some(reading);
            if shared.sync_armed {
                shared.sync_armed = false;
                shared.anchor = Some(reading.arrival_tick);
            }
            cell.set(shared);
        });
    }

    /// Latest published reading, if any arrived yet.
    pub fn latest(&self) -> Option<TemperatureReading> {
        critical_section::with(|cs| self.shared.borrow(cs).get().reading)
    }

    /// Re-arms anchor capture and discards any unconsumed anchor.
    ///
    /// Called from the main loop on a stopped-to-running transition so
    /// the next accepted reading establishes a fresh time base.
    pub fn arm_sync(&self) {
        critical_section::with(|cs| {
            let cell = self.shared.borrow(cs);
            let mut shared = cell.get();
            shared.sync_armed = true;
            shared.anchor = None;
            cell.set(shared);
        });
    }

    /// Collects the pending anchor tick, at most once per arming.
    pub fn take_anchor(&self) -> Option<u32> {
        critical_section::with(|cs| {
            let cell = self.shared.borrow(cs);
            let mut shared = cell.get();
            let anchor = shared.anchor.take();
            cell.set(shared);
            anchor
        })
    }
}

impl fmt::Debug for TempStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TempStore { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(raw: u16, arrival_tick: u32) -> TemperatureReading {
        TemperatureReading { raw, arrival_tick }
    }

    #[test]
    fn latest_reading_supersedes() {
        let store = TempStore::new();
        assert_eq!(store.latest(), None);

        store.publish(reading(332, 10));
        store.publish(reading(340, 20));
        assert_eq!(store.latest(), Some(reading(340, 20)));
    }

    #[test]
    fn first_publish_captures_anchor_once() {
        let store = TempStore::new();
        store.publish(reading(332, 10));
        store.publish(reading(340, 20));

        assert_eq!(store.take_anchor(), Some(10));
        assert_eq!(store.take_anchor(), None);
    }

    #[test]
    fn rearming_captures_a_fresh_anchor() {
        let store = TempStore::new();
        store.publish(reading(332, 10));
        assert_eq!(store.take_anchor(), Some(10));

        store.arm_sync();
        assert_eq!(store.take_anchor(), None);
        store.publish(reading(340, 500));
        assert_eq!(store.take_anchor(), Some(500));
    }

    #[test]
    fn range_boundaries_are_inclusive() {
        let range = TempRange::default();
        assert!(range.contains(0));
        assert!(range.contains(1000));
        assert!(!range.contains(1001));
    }

    #[test]
    fn scaled_value_is_tenths() {
        assert_eq!(reading(332, 0).celsius(), 33.2);
    }
}
