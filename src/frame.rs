//! Byte-at-a-time telemetry frame parsing.
//!
//! This module implements the receive-side protocol state machine. It is
//! fed one byte at a time from the host's byte-arrival interrupt and
//! reconstructs validated temperature readings out of the stream.
//!
//! Two framing flavors exist in the field and are covered by one
//! configurable [`FrameDescriptor`]:
//!
//! - **Fixed-offset framing**: the payload sits a known number of bytes
//!   behind the header; there is no length field and usually no checksum.
//! - **Length-delimited framing**: the header is followed by a two-byte
//!   little-endian total frame length and a command selector byte, with
//!   an optional XOR trailer closing the frame.
//!
//! The parser is O(1) per byte, never blocks, and never allocates. Any
//! byte inconsistent with the current state (wrong header, implausible
//! length, wrong command, failed checksum) silently drops the partial
//! frame and returns to header hunting — that is the desired recovery
//! for a stream joined mid-frame or corrupted by line noise, and the
//! same recovery the host should trigger via [`FrameParser::resync`] on
//! a transport fault (overrun, framing error).
//!
//! ## Example
//!
//! ```rust
//! use tempmon::frame::{FrameDescriptor, FrameParser};
//!
//! let mut parser = FrameParser::new(FrameDescriptor::default()).unwrap();
//! let frame = [0xFC, 0x0A, 0x00, 0x01, 0x4C, 0x01, 0x00, 0x00, 0x00, 0x00];
//! let mut reading = None;
//! for byte in frame {
//!     reading = parser.feed(byte).or(reading);
//! }
//! assert_eq!(reading, Some(0x014C)); // 33.2 degrees in tenths
//! ```

use crate::checksum::xor_update;
use crate::consts::{FRAME_HEADER, TEMP_COMMAND, TEMP_PAYLOAD_LEN};
use thiserror::Error;

/// Where the payload sits inside a frame, and what guards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Framing {
    /// The payload starts a fixed number of bytes behind the header; no
    /// length field is transmitted.
    Fixed {
        /// Bytes to skip between the header and the first payload byte.
        payload_offset: u8,
    },
    /// The header is followed by a two-byte little-endian length field
    /// (total frame length, header through trailer) and a command
    /// selector byte.
    LengthDelimited {
        /// Command byte a frame must carry to be accepted.
        command: u8,
    },
}

/// Shape of the frames a [`FrameParser`] accepts.
///
/// The default descriptor matches the stock telemetry source:
/// `FC 0A 00 01` followed by a six-byte payload, no trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct FrameDescriptor {
    /// Header byte opening every frame.
    pub header: u8,
    /// Framing flavor (fixed-offset or length-delimited).
    pub framing: Framing,
    /// Payload width in bytes. The reading occupies the first two bytes,
    /// little-endian; any remainder is carried but ignored.
    pub payload_len: u8,
    /// Whether the frame closes with an XOR trailer over all preceding
    /// bytes.
    pub checksum: bool,
}

impl Default for FrameDescriptor {
    fn default() -> Self {
        Self {
            header: FRAME_HEADER,
            framing: Framing::LengthDelimited {
                command: TEMP_COMMAND,
            },
            payload_len: TEMP_PAYLOAD_LEN,
            checksum: false,
        }
    }
}

impl FrameDescriptor {
    /// Total on-wire frame length for this descriptor, header through
    /// trailer.
    ///
    /// In length-delimited framing the declared length must equal this
    /// value exactly; anything else (including the transmitter's short
    /// request frames) drops the partial frame.
    pub fn frame_len(&self) -> u16 {
        let trailer = u16::from(self.checksum);
        match self.framing {
            Framing::Fixed { payload_offset } => {
                1 + u16::from(payload_offset) + u16::from(self.payload_len) + trailer
            }
            Framing::LengthDelimited { .. } => 1 + 2 + 1 + u16::from(self.payload_len) + trailer,
        }
    }

    /// Checks that the descriptor can carry a reading at all.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        if self.payload_len < 2 {
            return Err(DescriptorError::PayloadTooNarrow(self.payload_len));
        }
        Ok(())
    }
}

/// A descriptor rejected at parser construction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorError {
    /// The payload must be at least two bytes wide to carry a
    /// little-endian 16-bit reading.
    #[error("payload width {0} cannot carry a 16-bit reading")]
    PayloadTooNarrow(u8),
}

/// Parse phase, carrying only the data its phase needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Hunting for the header byte.
    AwaitHeader,
    /// Header seen; expecting the low length byte.
    AwaitLengthLo,
    /// Expecting the high length byte.
    AwaitLengthHi {
        /// Low length byte already received.
        lo: u8,
    },
    /// Length validated; expecting the command selector.
    AwaitCommand,
    /// Consuming filler bytes ahead of a fixed-offset payload.
    SkipFixedOffset {
        /// Filler bytes still to consume.
        remaining: u8,
    },
    /// Consuming payload bytes.
    AwaitPayload {
        /// Payload bytes still to consume.
        remaining: u8,
    },
    /// Payload complete; expecting the XOR trailer.
    AwaitChecksum,
}

/// Receive-side protocol state machine.
///
/// Feed it every received byte via [`feed`](FrameParser::feed); it
/// returns the raw little-endian reading each time a frame validates in
/// full. All error recovery is silent resynchronization — a corrupted or
/// mid-joined stream costs at most the frames it damaged.
///
/// The parser belongs to the byte-arrival context exclusively and needs
/// no locking of its own.
#[derive(Debug)]
pub struct FrameParser {
    desc: FrameDescriptor,
    state: ParserState,
    /// Running XOR over the consumed frame bytes.
    xor: u8,
    /// First two payload bytes, little-endian reading.
    value: [u8; 2],
    /// Payload bytes consumed so far.
    seen: u8,

    /// Frames accepted in full.
    pub good: u16,

    /// Frames dropped after the header matched (bad length, command, or
    /// trailer). Header misses while hunting are not counted.
    pub bad: u16,
}

impl FrameParser {
    /// Creates a parser for the given frame shape.
    pub fn new(desc: FrameDescriptor) -> Result<Self, DescriptorError> {
        desc.validate()?;
        Ok(Self {
            desc,
            state: ParserState::AwaitHeader,
            xor: 0,
            value: [0; 2],
            seen: 0,
            good: 0,
            bad: 0,
        })
    }

    /// Drops any partial frame and returns to header hunting.
    ///
    /// Call on transport faults (overrun, noise, framing error); the
    /// recovery is the same one a bad in-frame byte triggers.
    pub fn resync(&mut self) {
        self.state = ParserState::AwaitHeader;
    }

    /// Consumes one received byte; returns the raw reading when a frame
    /// completes and validates.
    ///
    /// O(1), non-blocking, allocation-free; safe to call from a receive
    /// interrupt.
    pub fn feed(&mut self, byte: u8) -> Option<u16> {
        match self.state {
            ParserState::AwaitHeader => {
                if byte == self.desc.header {
                    self.xor = byte;
                    self.seen = 0;
                    self.state = match self.desc.framing {
                        Framing::LengthDelimited { .. } => ParserState::AwaitLengthLo,
                        Framing::Fixed { payload_offset } if payload_offset > 0 => {
                            ParserState::SkipFixedOffset {
                                remaining: payload_offset,
                            }
                        }
                        Framing::Fixed { .. } => ParserState::AwaitPayload {
                            remaining: self.desc.payload_len,
                        },
                    };
                }
                None
            }
            ParserState::AwaitLengthLo => {
                self.xor = xor_update(self.xor, byte);
                self.state = ParserState::AwaitLengthHi { lo: byte };
                None
            }
            ParserState::AwaitLengthHi { lo } => {
                self.xor = xor_update(self.xor, byte);
                let declared = u16::from_le_bytes([lo, byte]);
                if declared == self.desc.frame_len() {
                    self.state = ParserState::AwaitCommand;
                } else {
                    self.reject();
                }
                None
            }
            ParserState::AwaitCommand => {
                self.xor = xor_update(self.xor, byte);
                let accepted = match self.desc.framing {
                    Framing::LengthDelimited { command } => byte == command,
                    Framing::Fixed { .. } => false,
                };
                if accepted {
                    self.state = ParserState::AwaitPayload {
                        remaining: self.desc.payload_len,
                    };
                } else {
                    self.reject();
                }
                None
            }
            ParserState::SkipFixedOffset { remaining } => {
                self.xor = xor_update(self.xor, byte);
                self.state = if remaining > 1 {
                    ParserState::SkipFixedOffset {
                        remaining: remaining - 1,
                    }
                } else {
                    ParserState::AwaitPayload {
                        remaining: self.desc.payload_len,
                    }
                };
                None
            }
            ParserState::AwaitPayload { remaining } => {
                self.xor = xor_update(self.xor, byte);
                if (self.seen as usize) < self.value.len() {
                    self.value[self.seen as usize] = byte;
                }
                self.seen += 1;
                if remaining > 1 {
                    self.state = ParserState::AwaitPayload {
                        remaining: remaining - 1,
                    };
                    None
                } else if self.desc.checksum {
                    self.state = ParserState::AwaitChecksum;
                    None
                } else {
                    self.accept()
                }
            }
            ParserState::AwaitChecksum => {
                // The trailer is the XOR of everything before it.
                if byte == self.xor {
                    self.accept()
                } else {
                    self.reject();
                    None
                }
            }
        }
    }

    fn accept(&mut self) -> Option<u16> {
        self.state = ParserState::AwaitHeader;
        self.good = self.good.wrapping_add(1);
        Some(u16::from_le_bytes(self.value))
    }

    fn reject(&mut self) {
        self.bad = self.bad.wrapping_add(1);
        self.state = ParserState::AwaitHeader;
    }
}
