//! Debounced run/stop latch driven by a control input.
//!
//! A mechanical control line bounces for a few milliseconds around each
//! press. The latch therefore confirms every candidate edge with a
//! second, time-spaced read: the first active sample opens a pending
//! window, and a poll at least the debounce delay later either confirms
//! the level (toggling the latch) or discards the candidate as bounce.
//! Nothing blocks — both reads happen on ordinary main-loop polls.
//!
//! The latch starts in the running state, and a held input toggles only
//! once; the line must go inactive before a new press is recognized.

use embedded_hal::digital::InputPin;

/// A confirmed run-state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RunEvent {
    /// The latch toggled to running.
    Started,
    /// The latch toggled to stopped.
    Stopped,
}

/// Edge-triggered, debounced start/stop latch.
#[derive(Debug)]
pub struct RunControl<PIN>
where
    PIN: InputPin,
{
    pin: PIN,
    active_low: bool,
    debounce_ms: u32,
    running: bool,
    last_active: bool,
    pending_since: Option<u32>,
}

impl<PIN> RunControl<PIN>
where
    PIN: InputPin,
{
    /// Creates a latch in the running state.
    ///
    /// `active_low` selects the level that counts as "pressed";
    /// `debounce_ms` is the confirmation delay between the two reads.
    pub fn new(pin: PIN, active_low: bool, debounce_ms: u32) -> Self {
        Self {
            pin,
            active_low,
            debounce_ms,
            running: true,
            last_active: false,
            pending_since: None,
        }
    }

    /// Current latch state.
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn read_active(&mut self) -> bool {
        if self.active_low {
            self.pin.is_low().unwrap_or(false)
        } else {
            self.pin.is_high().unwrap_or(false)
        }
    }

    /// Samples the control line once; returns the transition if a press
    /// was confirmed on this poll.
    pub fn poll(&mut self, now: u32) -> Option<RunEvent> {
        let active = self.read_active();
        let event = match self.pending_since {
            Some(since) if now.wrapping_sub(since) >= self.debounce_ms => {
                self.pending_since = None;
                if active {
                    self.running = !self.running;
                    Some(if self.running {
                        RunEvent::Started
                    } else {
                        RunEvent::Stopped
                    })
                } else {
                    // The level did not hold; bounce.
                    None
                }
            }
            Some(_) => None,
            None => {
                if active && !self.last_active {
                    self.pending_since = Some(now);
                }
                None
            }
        };
        self.last_active = active;
        event
    }
}
