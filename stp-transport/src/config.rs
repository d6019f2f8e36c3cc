//! Construction-time configuration for a [`crate::transport::TransportLayer`].
//!
//! Every field is fixed for the lifetime of the instance; there is no
//! runtime reconfiguration. [`TransportConfig::validate`] enforces the exact
//! order spelled out by the data model: `MAX_TX` range, then `min_rx` range,
//! then `start_byte != delimiter_byte`, then a positive baud rate, then a
//! non-negative timeout — so a caller presented with the first error in a
//! malformed configuration sees the same one every time.

use crate::error::ConfigError;

/// Construction-time parameters for a [`crate::transport::TransportLayer`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// OS port identifier, e.g. `/dev/ttyUSB0` or `COM3`. Unused by
    /// `new_mock`.
    pub port_name: String,
    /// Baud rate, must be positive.
    pub baud_rate: i64,
    /// Largest payload the transmission buffer can hold, in `[1, 254]`.
    pub max_tx: usize,
    /// Largest payload the reception buffer can hold, in `[1, 254]`.
    pub max_rx: usize,
    /// Smallest payload `receive_data` will accept, in `[1, 254]`. Defaults
    /// to 1 via [`TransportConfig::new`].
    pub min_rx: usize,
    /// Byte marking the start of a packet.
    pub start_byte: u8,
    /// Byte COBS treats as the frame delimiter. Must differ from
    /// `start_byte`.
    pub delimiter_byte: u8,
    /// Per-byte inactivity timeout, in microseconds. Must be non-negative.
    pub timeout_us: i64,
    /// When set, `receive_data` fails with `ReceiveFault::NoStart` instead
    /// of silently returning `false` when no start byte is found among the
    /// scanned bytes.
    pub allow_start_byte_errors: bool,
}

impl TransportConfig {
    /// Builds a configuration with `min_rx` defaulted to 1 and
    /// `allow_start_byte_errors` defaulted to `false`.
    pub fn new(
        port_name: impl Into<String>,
        baud_rate: i64,
        max_tx: usize,
        max_rx: usize,
        start_byte: u8,
        delimiter_byte: u8,
        timeout_us: i64,
    ) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            max_tx,
            max_rx,
            min_rx: 1,
            start_byte,
            delimiter_byte,
            timeout_us,
            allow_start_byte_errors: false,
        }
    }

    /// Overrides the default `min_rx` of 1.
    pub fn with_min_rx(mut self, min_rx: usize) -> Self {
        self.min_rx = min_rx;
        self
    }

    /// Overrides the default `allow_start_byte_errors` of `false`.
    pub fn with_allow_start_byte_errors(mut self, allow: bool) -> Self {
        self.allow_start_byte_errors = allow;
        self
    }

    /// Validates every field, returning the first violation found in the
    /// order documented on this type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=254).contains(&self.max_tx) {
            return Err(ConfigError::MaxTxOutOfRange { value: self.max_tx });
        }
        if !(1..=254).contains(&self.min_rx) {
            return Err(ConfigError::MinRxOutOfRange { value: self.min_rx });
        }
        if self.start_byte == self.delimiter_byte {
            return Err(ConfigError::StartByteEqualsDelimiter {
                start_byte: self.start_byte,
                delimiter_byte: self.delimiter_byte,
            });
        }
        if self.baud_rate <= 0 {
            return Err(ConfigError::NonPositiveBaudRate { value: self.baud_rate });
        }
        if self.timeout_us < 0 {
            return Err(ConfigError::NegativeTimeout { value: self.timeout_us });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> TransportConfig {
        TransportConfig::new("/dev/ttyUSB0", 115_200, 254, 254, 129, 0, 5_000)
    }

    #[test]
    fn defaults_validate_cleanly() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_max_tx_out_of_range_first() {
        let mut cfg = base();
        cfg.max_tx = 0;
        cfg.min_rx = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::MaxTxOutOfRange { value: 0 })));
    }

    #[test]
    fn rejects_min_rx_out_of_range_after_max_tx() {
        let mut cfg = base();
        cfg.min_rx = 255;
        assert!(matches!(cfg.validate(), Err(ConfigError::MinRxOutOfRange { value: 255 })));
    }

    #[test]
    fn rejects_matching_start_and_delimiter_bytes() {
        let mut cfg = base();
        cfg.delimiter_byte = cfg.start_byte;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::StartByteEqualsDelimiter { start_byte, delimiter_byte })
                if start_byte == cfg.start_byte && delimiter_byte == cfg.start_byte
        ));
    }

    #[test]
    fn rejects_non_positive_baud_rate() {
        let mut cfg = base();
        cfg.baud_rate = 0;
        assert!(matches!(cfg.validate(), Err(ConfigError::NonPositiveBaudRate { value: 0 })));
    }

    #[test]
    fn rejects_negative_timeout() {
        let mut cfg = base();
        cfg.timeout_us = -1;
        assert!(matches!(cfg.validate(), Err(ConfigError::NegativeTimeout { value: -1 })));
    }
}
