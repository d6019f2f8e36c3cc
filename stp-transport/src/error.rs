//! Structured errors raised by the transport layer.
//!
//! Mirrors `stp-core`'s split: construction, write/read, and reception
//! framing faults each get their own enum, because a caller handling one
//! kind of failure has no use for another kind's variants. [`TransportError`]
//! unions the three (plus the internal-consistency variant) for call sites
//! that want one return type across all four operations.

use stp_core::error::{CobsDecodeError, ReadError, WriteError};

/// Failure modes of [`crate::transport::TransportLayer::new`] (and
/// [`crate::transport::TransportLayer::new_mock`]).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `MAX_TX` fell outside `[1, 254]`.
    #[error("invalid 'max_tx': expected a value in [1, 254], got {value}")]
    MaxTxOutOfRange {
        /// The offending value.
        value: usize,
    },
    /// `min_rx` fell outside `[1, 254]`.
    #[error("invalid 'min_rx': expected a value in [1, 254], got {value}")]
    MinRxOutOfRange {
        /// The offending value.
        value: usize,
    },
    /// `start_byte` and `delimiter_byte` were configured to the same value.
    #[error("invalid 'delimiter_byte': expected a value different from start_byte ({start_byte}), got {delimiter_byte}")]
    StartByteEqualsDelimiter {
        /// The shared value both fields were set to.
        start_byte: u8,
        /// Same as `start_byte`; kept separate for message symmetry.
        delimiter_byte: u8,
    },
    /// `baud_rate` was zero or negative.
    #[error("invalid 'baud_rate': expected a positive value, got {value}")]
    NonPositiveBaudRate {
        /// The offending value.
        value: i64,
    },
    /// The per-byte inactivity timeout was negative.
    #[error("invalid 'timeout_us': expected a non-negative value, got {value}")]
    NegativeTimeout {
        /// The offending value.
        value: i64,
    },
    /// Opening the underlying serial device failed.
    #[error("failed to open serial port '{port}': {source}")]
    PortOpenFailed {
        /// The port identifier that was passed to `serialport::new`.
        port: String,
        /// The underlying I/O failure.
        #[source]
        source: anyhow::Error,
    },
}

/// Failure modes of [`crate::transport::TransportLayer::write_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WriteDataError {
    /// The value does not fit at `start_index` in the transmission buffer.
    #[error(transparent)]
    Capacity(#[from] WriteError),
}

/// Failure modes of [`crate::transport::TransportLayer::read_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReadDataError {
    /// Not enough bytes remained in the reception buffer at `start_index`.
    #[error(transparent)]
    Capacity(#[from] ReadError),
}

/// Reception framing faults. Every variant here is fatal for the *current*
/// `receive_data` call; leftover staging bytes are preserved across the
/// return in case they help a later call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReceiveFault {
    /// Scanned the available bytes without finding `start_byte`, and
    /// `allow_start_byte_errors` is set.
    #[error("no start byte (0x{start_byte:02X}) found in {bytes_scanned} scanned byte(s)")]
    NoStart {
        /// The configured start byte that was being searched for.
        start_byte: u8,
        /// How many bytes were scanned before giving up.
        bytes_scanned: usize,
    },
    /// The per-byte timeout fired while waiting for the payload-size byte.
    #[error("timed out waiting for the payload size byte")]
    SizeTimeout,
    /// The declared payload size was outside `[min_rx, MAX_RX]`.
    #[error("invalid declared payload size: expected a value in [{min_rx}, {max_rx}], got {declared}")]
    BadSize {
        /// The size byte read from the wire.
        declared: u8,
        /// The configured lower bound.
        min_rx: u8,
        /// The configured upper bound (`MAX_RX`).
        max_rx: u8,
    },
    /// The per-byte timeout fired before the rest of the packet arrived.
    #[error("packet stalled: timed out after receiving {received_so_far} of {expected} expected byte(s)")]
    PacketStaled {
        /// Bytes of the packet body received before the timeout fired.
        received_so_far: usize,
        /// Total bytes the packet body was expected to need.
        expected: usize,
    },
    /// The CRC recomputed over the received bytes did not match the
    /// CRC carried on the wire.
    #[error("CRC mismatch: received 0x{received:X}, expected 0x{expected:X}")]
    CrcMismatch {
        /// Checksum carried in the packet's postamble.
        received: u64,
        /// Checksum recomputed from the received bytes.
        expected: u64,
    },
    /// COBS decoding of the packet body failed.
    #[error("COBS decode failed: {0}")]
    CobsDecodeFailed(#[from] CobsDecodeError),
}

/// Union of every error the transport layer's public operations can raise.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`WriteDataError`].
    #[error(transparent)]
    Write(#[from] WriteDataError),
    /// See [`ReadDataError`].
    #[error(transparent)]
    Read(#[from] ReadDataError),
    /// See [`ReceiveFault`].
    #[error(transparent)]
    Receive(#[from] ReceiveFault),
    /// The codec produced a different result the second time it was invoked
    /// on the same input, or some other invariant the framing layer relies
    /// on was violated. Not expected to ever trigger; reported rather than
    /// panicking so a host application can decide how to fail.
    #[error("internal consistency failure: {0}")]
    Internal(String),
    /// Writing to or reading from the serial port failed at the OS level.
    #[error("serial port I/O error: {0}")]
    Io(#[from] std::io::Error),
}
