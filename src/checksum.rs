//! XOR frame checksum.
//!
//! The trailer byte of a checksummed frame is the XOR of every byte that
//! precedes it, header included. Exposed so hosts and test harnesses can
//! build valid frames.

/// Folds one byte into a running XOR checksum.
pub fn xor_update(acc: u8, byte: u8) -> u8 {
    acc ^ byte
}

/// XOR checksum of a whole byte slice.
pub fn xor_of(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| xor_update(acc, *b))
}
