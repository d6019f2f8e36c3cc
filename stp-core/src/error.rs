//! Structured, matchable error types for the codec core.
//!
//! Each operation gets its own enum so a caller handling a decode failure
//! never has to think about write-side variants, and vice versa. Messages
//! carry the offending values; callers are expected to match on the variant,
//! not on the message text.

/// Failure modes of [`crate::cobs::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CobsEncodeError {
    /// The payload is shorter or longer than COBS can frame in one run.
    #[error("payload length {len} is outside the COBS-encodable range [1, 254]")]
    PayloadLengthOutOfRange {
        /// The offending payload length.
        len: usize,
    },
    /// The caller-supplied output buffer cannot hold `payload.len() + 2` bytes.
    #[error("output buffer has {available} byte(s), but encoding requires {required}")]
    OutputTooSmall {
        /// Bytes required: `payload.len() + 2`.
        required: usize,
        /// Bytes actually available in the output buffer.
        available: usize,
    },
}

/// Failure modes of [`crate::cobs::decode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CobsDecodeError {
    /// The declared decoded length is outside the range COBS can represent.
    #[error("declared payload length {len} is outside the COBS-decodable range [1, 254]")]
    PayloadLengthOutOfRange {
        /// The offending declared length.
        len: usize,
    },
    /// A jump slot held a distance of zero, which can never occur in a
    /// validly encoded frame.
    #[error("jump distance of 0 encountered at offset {offset}")]
    ZeroJump {
        /// Index, relative to the overhead byte, of the offending jump slot.
        offset: usize,
    },
    /// Following a jump landed past the expected trailing delimiter.
    #[error("jump at offset {offset} overshoots the trailing delimiter by {overshoot} byte(s)")]
    JumpOvershoot {
        /// Index of the jump slot that overshot.
        offset: usize,
        /// How far past the trailing delimiter the jump landed.
        overshoot: usize,
    },
    /// The byte at the position the hop chain predicted for the trailing
    /// delimiter was not the delimiter.
    #[error("expected trailing delimiter 0x{delimiter:02X} at offset {offset}, found 0x{found:02X}")]
    MissingDelimiter {
        /// Index where the trailing delimiter was expected.
        offset: usize,
        /// The delimiter value that should have been there.
        delimiter: u8,
        /// The byte actually found.
        found: u8,
    },
}

/// Failure modes of [`crate::marshal::WireValue::write_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// The value does not fit at `start_index` in the destination buffer.
    #[error(
        "value of {size} byte(s) does not fit at index {start_index} in a buffer of {capacity} byte(s)"
    )]
    InsufficientBufferCapacity {
        /// Index the write was attempted at.
        start_index: usize,
        /// Size, in bytes, of the value being written.
        size: usize,
        /// Total capacity of the destination buffer.
        capacity: usize,
    },
    /// An array operand had zero elements.
    #[error("array operand is empty; at least one element is required")]
    EmptyArray,
}

/// Failure modes of [`crate::marshal::WireValue::read_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The source buffer does not hold enough bytes at `start_index`.
    #[error(
        "value of {size} byte(s) does not fit at index {start_index} in a buffer holding {available} byte(s)"
    )]
    InsufficientData {
        /// Index the read was attempted at.
        start_index: usize,
        /// Size, in bytes, of the value being read.
        size: usize,
        /// Bytes actually available from `start_index` onward.
        available: usize,
    },
    /// An array operand had zero elements.
    #[error("array operand is empty; at least one element is required")]
    EmptyArray,
}
