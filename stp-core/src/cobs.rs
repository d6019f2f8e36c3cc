//! Consistent Overhead Byte Stuffing with a caller-chosen delimiter.
//!
//! Unlike the classic fixed-zero-byte COBS (see e.g. the `corncobs` crate),
//! the wire format here lets the delimiter be any byte in `[0, 255]`, chosen
//! once at transport construction so it can't collide with a protocol's own
//! framing conventions. The textbook algorithm only gets its "no interior
//! occurrence of the special byte" guarantee for free when that byte is 0:
//! every jump slot holds a raw distance in `[1, 255]`, which can never equal
//! 0, but it can coincidentally equal an arbitrary nonzero delimiter. Each
//! jump slot here stores `distance ^ delimiter` instead of the raw distance.
//! Since a jump slot's true distance is always nonzero, XORing it with
//! `delimiter` can never reproduce `delimiter` itself (`d ^ delimiter ==
//! delimiter` only when `d == 0`), so the stuffed frame is delimiter-free for
//! every configured delimiter, not just zero. Decoding XORs back to recover
//! the true distance before following it.
//!
//! Both directions work on a caller-supplied buffer rather than an owned
//! `Vec`, so this module has no allocator dependency and stays usable on a
//! `no_std` target.

use crate::error::{CobsDecodeError, CobsEncodeError};

/// Smallest payload COBS can frame.
pub const MIN_PAYLOAD_LEN: usize = 1;
/// Largest payload COBS can frame in a single run. A distance byte is a
/// single `u8`, so a jump chain can span at most 255 bytes, and one slot is
/// spent on the frame's own overhead byte.
pub const MAX_PAYLOAD_LEN: usize = 254;

/// Returns the size, in bytes, of the COBS frame for a `len`-byte payload:
/// one overhead byte, the payload itself, and one trailing delimiter.
pub const fn encoded_len(len: usize) -> usize {
    len + 2
}

/// Encodes `payload` into `output` as `[overhead][stuffed payload][delimiter]`.
///
/// `output` must be at least `encoded_len(payload.len())` bytes; only that
/// many bytes are written. Returns the number of bytes written, which is
/// always exactly `payload.len() + 2` on success.
pub fn encode(payload: &[u8], delimiter: u8, output: &mut [u8]) -> Result<usize, CobsEncodeError> {
    let len = payload.len();
    if !(MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&len) {
        return Err(CobsEncodeError::PayloadLengthOutOfRange { len });
    }
    let required = encoded_len(len);
    if output.len() < required {
        return Err(CobsEncodeError::OutputTooSmall {
            required,
            available: output.len(),
        });
    }

    output[1..=len].copy_from_slice(payload);
    output[len + 1] = delimiter;

    // `last_jump` is the index of the most recently written jump slot; index
    // 0 (the overhead byte) is the first one. Every time we cross a byte
    // equal to `delimiter`, that byte's slot becomes the next jump target and
    // gets backfilled with the distance from `last_jump`, XORed with
    // `delimiter` so the stored byte itself can never equal `delimiter`.
    let mut last_jump = 0usize;
    for (i, &b) in payload.iter().enumerate() {
        if b == delimiter {
            let slot = i + 1;
            let distance = (slot - last_jump) as u8;
            output[last_jump] = distance ^ delimiter;
            last_jump = slot;
        }
    }
    let distance = (len + 1 - last_jump) as u8;
    output[last_jump] = distance ^ delimiter;

    Ok(required)
}

/// Decodes a COBS frame in place.
///
/// `buffer` must start at the overhead byte and hold at least
/// `encoded_len(len)` bytes, where `len` is the expected decoded payload
/// length. On success, `buffer[1..=len]` holds the original payload (jump
/// slots have been restored to `delimiter`) and `buffer[len + 1]` is the
/// trailing delimiter.
pub fn decode(buffer: &mut [u8], len: usize, delimiter: u8) -> Result<(), CobsDecodeError> {
    if !(MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&len) {
        return Err(CobsDecodeError::PayloadLengthOutOfRange { len });
    }
    let end = len + 1;
    debug_assert!(buffer.len() > end, "caller must supply encoded_len(len) bytes");

    let mut pos = 0usize;
    loop {
        // Undo the encoder's XOR to recover the true jump distance before
        // this slot (if `pos > 0`) is overwritten with `delimiter` below.
        let distance = (buffer[pos] ^ delimiter) as usize;
        if distance == 0 {
            return Err(CobsDecodeError::ZeroJump { offset: pos });
        }
        let next = pos + distance;
        if next > end {
            return Err(CobsDecodeError::JumpOvershoot {
                offset: pos,
                overshoot: next - end,
            });
        }
        // `pos == 0` is the overhead byte, not a payload position; every
        // later jump slot held the delimiter before the encoder overwrote it
        // with a distance, so it's restored here now that its distance has
        // been consumed.
        if pos != 0 {
            buffer[pos] = delimiter;
        }
        if next == end {
            if buffer[end] != delimiter {
                return Err(CobsDecodeError::MissingDelimiter {
                    offset: end,
                    delimiter,
                    found: buffer[end],
                });
            }
            return Ok(());
        }
        pos = next;
    }
}
