//! Shared wire-format constants describing the packet layout:
//!
//! ```text
//! | start_byte | payload_size | overhead | COBS(payload) | delimiter | crc |
//! ```
//!
//! `stp-transport` uses these to size its buffers and to recognize the
//! smallest possible packet while scanning for a start byte.

use crate::cobs;

/// Smallest payload a packet can carry, in bytes.
pub const MIN_PAYLOAD_SIZE: usize = cobs::MIN_PAYLOAD_LEN;
/// Largest payload a packet can carry in a single frame, in bytes.
pub const MAX_PAYLOAD_SIZE: usize = cobs::MAX_PAYLOAD_LEN;

/// Size, in bytes, of the start byte field.
pub const START_BYTE_SIZE: usize = 1;
/// Size, in bytes, of the payload-size field that precedes the COBS frame.
pub const PAYLOAD_SIZE_FIELD_SIZE: usize = 1;

/// Smallest complete packet possible on the wire: start byte, size byte, a
/// one-byte COBS frame (overhead + single payload byte + delimiter), and a
/// `crc_size`-byte postamble.
pub const fn minimum_packet_size(crc_size: usize) -> usize {
    START_BYTE_SIZE + PAYLOAD_SIZE_FIELD_SIZE + cobs::encoded_len(MIN_PAYLOAD_SIZE) + crc_size
}

/// Total packet size, in bytes, for a packet carrying `payload_len` bytes of
/// payload and a `crc_size`-byte postamble.
pub const fn packet_size(payload_len: usize, crc_size: usize) -> usize {
    START_BYTE_SIZE + PAYLOAD_SIZE_FIELD_SIZE + cobs::encoded_len(payload_len) + crc_size
}
