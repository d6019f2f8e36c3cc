//! The framing state machine: owns the transmission and reception buffers,
//! the leftover-byte staging area, and the serial port handle, and exposes
//! `write_data` / `send_data` / `receive_data` / `read_data` plus the
//! buffer-bookkeeping operations.
//!
//! `receive_data` runs the phase table from the component design straight
//! through in one synchronous call: IDLE, FIND_START, READ_SIZE,
//! VALIDATE_SIZE, READ_PACKET, VERIFY_CRC, DECODE, DONE. Every fatal
//! transition logs at `warn` before returning its error; the silent `false`
//! paths and a successful decode log at `trace`.

use std::collections::VecDeque;
use std::time::Duration;

use stp_core::crc::{CrcProcessor, CrcWidth};
use stp_core::marshal::WireValue;
use stp_core::{cobs, wire};

use crate::config::TransportConfig;
use crate::error::{ConfigError, ReadDataError, ReceiveFault, TransportError, WriteDataError};
use crate::mock_port::{MockDeviceHandle, MockSerialPort};
use crate::serial_port::{SerialDevice, SerialPort};
use crate::timer::MicrosecondTimer;

/// The framing state machine for one physical (or mock) serial link.
pub struct TransportLayer<P: SerialPort, W: CrcWidth> {
    tx_buffer: Vec<u8>,
    bytes_in_tx: usize,
    rx_buffer: Vec<u8>,
    bytes_in_rx: usize,
    leftover: VecDeque<u8>,
    port: P,
    crc: CrcProcessor<W>,
    config: TransportConfig,
}

impl<W: CrcWidth> TransportLayer<SerialDevice, W> {
    /// Validates `config`, opens the real serial device it names, and
    /// returns a transport ready to use.
    pub fn new(
        config: TransportConfig,
        crc: CrcProcessor<W>,
        settle_delay: Duration,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let port = SerialDevice::open(&config.port_name, config.baud_rate as u32, settle_delay)
            .map_err(|source| ConfigError::PortOpenFailed {
                port: config.port_name.clone(),
                source,
            })?;
        Ok(Self::from_parts(config, crc, port))
    }
}

impl<W: CrcWidth> TransportLayer<MockSerialPort, W> {
    /// Validates `config` and returns a transport backed by an in-memory
    /// loopback pair, along with the device-side handle used to inject and
    /// inspect bytes in tests.
    pub fn new_mock(
        config: TransportConfig,
        crc: CrcProcessor<W>,
    ) -> Result<(Self, MockDeviceHandle), ConfigError> {
        config.validate()?;
        let (port, handle) = MockSerialPort::pair();
        Ok((Self::from_parts(config, crc, port), handle))
    }
}

impl<P: SerialPort, W: CrcWidth> TransportLayer<P, W> {
    fn from_parts(config: TransportConfig, crc: CrcProcessor<W>, port: P) -> Self {
        let tx_buffer = vec![0u8; config.max_tx + 1];
        let rx_buffer = vec![0u8; config.max_rx + 1];
        log::debug!(
            "transport layer constructed: max_tx={} max_rx={} min_rx={} start_byte=0x{:02X} delimiter_byte=0x{:02X}",
            config.max_tx, config.max_rx, config.min_rx, config.start_byte, config.delimiter_byte
        );
        Self {
            tx_buffer,
            bytes_in_tx: 0,
            rx_buffer,
            bytes_in_rx: 0,
            leftover: VecDeque::new(),
            port,
            crc,
            config,
        }
    }

    /// Serializes `value` into the transmission buffer at `start_index`
    /// (defaulting to the current `bytes_in_tx`). Returns the index
    /// immediately past the last byte written.
    pub fn write_data<T: WireValue>(
        &mut self,
        value: &T,
        start_index: Option<usize>,
    ) -> Result<usize, WriteDataError> {
        let start = start_index.unwrap_or(self.bytes_in_tx);
        let end = value.write_into(&mut self.tx_buffer, start)?;
        self.bytes_in_tx = self.bytes_in_tx.max(end);
        Ok(end)
    }

    /// Deserializes a `T` from the reception buffer at `start_index`
    /// (defaulting to 0). Non-destructive: `bytes_in_rx` is unchanged.
    pub fn read_data<T: WireValue>(
        &self,
        start_index: Option<usize>,
    ) -> Result<(T, usize), ReadDataError> {
        let start = start_index.unwrap_or(0);
        let (value, end) = T::read_from(&self.rx_buffer, start)?;
        Ok((value, end))
    }

    /// Packages the transmission payload and writes it to the port.
    /// Returns `false` without touching the port if there is nothing to
    /// send.
    pub fn send_data(&mut self) -> Result<bool, TransportError> {
        if self.bytes_in_tx == 0 {
            log::trace!("send_data: transmission buffer is empty, nothing to send");
            return Ok(false);
        }
        let payload_len = self.bytes_in_tx;
        let cobs_len = cobs::encoded_len(payload_len);
        let crc_size = self.crc.postamble_size();

        let mut packet = vec![0u8; cobs_len + crc_size];
        cobs::encode(&self.tx_buffer[..payload_len], self.config.delimiter_byte, &mut packet[..cobs_len])
            .map_err(|e| {
                TransportError::Internal(format!(
                    "COBS encode failed on a payload already validated by write_data: {e}"
                ))
            })?;

        let checksum = self.crc.checksum(&packet[..cobs_len]);
        CrcProcessor::<W>::to_be_bytes(checksum, &mut packet[cobs_len..]);

        self.port.write(&[self.config.start_byte])?;
        self.port.write(&[payload_len as u8])?;
        self.port.write(&packet)?;

        log::trace!("send_data: sent {payload_len} byte payload, crc=0x{:X}", checksum.to_u64());
        self.bytes_in_tx = 0;
        Ok(true)
    }

    /// Drains available bytes from the port, locates a complete packet,
    /// validates it, and decodes it into the reception buffer. Returns
    /// `false` (without error) when no complete packet is available yet.
    pub fn receive_data(&mut self) -> Result<bool, TransportError> {
        let crc_size = self.crc.postamble_size();
        let min_packet = wire::minimum_packet_size(crc_size);

        // IDLE
        let available_now = self.leftover.len() + self.port.bytes_available()?;
        if available_now < min_packet {
            log::trace!("receive_data: IDLE, {available_now} byte(s) available, need {min_packet}");
            return Ok(false);
        }

        // FIND_START
        let mut scanned = 0usize;
        let found_start = loop {
            match self.leftover.pop_front() {
                Some(b) if b == self.config.start_byte => break true,
                Some(_) => {
                    scanned += 1;
                }
                None => {
                    if !self.await_bytes(1)? {
                        break false;
                    }
                }
            }
        };
        if !found_start {
            if self.config.allow_start_byte_errors {
                log::warn!(
                    "receive_data: FIND_START failed, scanned {scanned} byte(s) without finding start byte 0x{:02X}",
                    self.config.start_byte
                );
                return Err(ReceiveFault::NoStart {
                    start_byte: self.config.start_byte,
                    bytes_scanned: scanned,
                }
                .into());
            }
            log::trace!("receive_data: FIND_START timed out after scanning {scanned} byte(s); no packet yet");
            return Ok(false);
        }

        // READ_SIZE
        if !self.await_bytes(1)? {
            log::warn!("receive_data: SIZE_TIMEOUT waiting for the payload size byte");
            return Err(ReceiveFault::SizeTimeout.into());
        }
        let declared_size = self
            .leftover
            .pop_front()
            .expect("await_bytes(1) guarantees a byte is buffered");

        // VALIDATE_SIZE. Only the upper bound (MAX_RX) is enforced here;
        // min_rx gates construction, not individual declared sizes, and a
        // declared size of 0 is rejected downstream by COBS's own
        // MIN_PAYLOAD_LEN check during DECODE.
        if declared_size as usize > self.config.max_rx {
            log::warn!(
                "receive_data: BAD_SIZE declared={declared_size} min_rx={} max_rx={}",
                self.config.min_rx, self.config.max_rx
            );
            return Err(ReceiveFault::BadSize {
                declared: declared_size,
                min_rx: self.config.min_rx as u8,
                max_rx: self.config.max_rx as u8,
            }
            .into());
        }

        // READ_PACKET
        let declared = declared_size as usize;
        let cobs_len = cobs::encoded_len(declared);
        let needed = cobs_len + crc_size;
        if !self.await_bytes(needed)? {
            let received_so_far = self.leftover.len();
            log::warn!("receive_data: PACKET_STALED received {received_so_far} of {needed} expected byte(s)");
            return Err(ReceiveFault::PacketStaled {
                received_so_far,
                expected: needed,
            }
            .into());
        }
        let packet: Vec<u8> = self.leftover.drain(..needed).collect();

        // VERIFY_CRC
        let expected = self.crc.checksum(&packet[..cobs_len]);
        let received = CrcProcessor::<W>::from_be_bytes(&packet[cobs_len..needed]);
        if received != expected {
            log::warn!(
                "receive_data: CRC_MISMATCH received=0x{:X} expected=0x{:X}",
                received.to_u64(),
                expected.to_u64()
            );
            return Err(ReceiveFault::CrcMismatch {
                received: received.to_u64(),
                expected: expected.to_u64(),
            }
            .into());
        }

        // DECODE
        let mut cobs_frame = packet[..cobs_len].to_vec();
        if let Err(e) = cobs::decode(&mut cobs_frame, declared, self.config.delimiter_byte) {
            log::warn!("receive_data: COBS decode failed: {e}");
            return Err(ReceiveFault::CobsDecodeFailed(e).into());
        }
        self.rx_buffer[..declared].copy_from_slice(&cobs_frame[1..=declared]);
        self.bytes_in_rx = declared;

        log::trace!("receive_data: DONE, bytes_in_rx={declared}");
        Ok(true)
    }

    /// Resets `bytes_in_tx` to 0. The underlying bytes are left untouched.
    pub fn reset_transmission_buffer(&mut self) {
        self.bytes_in_tx = 0;
    }

    /// Resets `bytes_in_rx` to 0. The underlying bytes are left untouched.
    pub fn reset_reception_buffer(&mut self) {
        self.bytes_in_rx = 0;
    }

    /// Whether enough bytes are currently staged or waiting on the port to
    /// form at least a minimum-sized packet.
    pub fn available(&mut self) -> Result<bool, TransportError> {
        let crc_size = self.crc.postamble_size();
        let min_packet = wire::minimum_packet_size(crc_size);
        Ok(self.leftover.len() + self.port.bytes_available()? >= min_packet)
    }

    /// Current `bytes_in_tx`.
    pub fn bytes_in_transmission_buffer(&self) -> usize {
        self.bytes_in_tx
    }

    /// Current `bytes_in_rx`.
    pub fn bytes_in_reception_buffer(&self) -> usize {
        self.bytes_in_rx
    }

    /// Busy-polls the port until `self.leftover` holds at least `needed`
    /// bytes, resetting the inactivity timer every time the port yields at
    /// least one new byte. Returns `false` if the per-byte timeout fires
    /// before `needed` is reached.
    fn await_bytes(&mut self, needed: usize) -> Result<bool, TransportError> {
        if self.leftover.len() >= needed {
            return Ok(true);
        }
        let mut timer = MicrosecondTimer::new();
        let timeout_us = self.config.timeout_us as u64;
        loop {
            let pulled = self.pull_into_leftover()?;
            if self.leftover.len() >= needed {
                return Ok(true);
            }
            if pulled > 0 {
                timer.reset();
            } else if timer.has_elapsed(timeout_us) {
                return Ok(false);
            }
        }
    }

    /// Drains whatever the port currently has ready into `self.leftover`.
    /// Returns how many bytes were pulled.
    fn pull_into_leftover(&mut self) -> std::io::Result<usize> {
        let avail = self.port.bytes_available()?;
        if avail == 0 {
            return Ok(0);
        }
        let mut buf = vec![0u8; avail];
        let n = self.port.read(&mut buf)?;
        self.leftover.extend(buf[..n].iter().copied());
        Ok(n)
    }
}

impl<P: SerialPort, W: CrcWidth> Drop for TransportLayer<P, W> {
    fn drop(&mut self) {
        log::debug!("transport layer teardown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ccitt_false() -> CrcProcessor<u16> {
        CrcProcessor::new(0x1021, 0xFFFF, 0x0000)
    }

    fn mock_config(max_tx: usize, max_rx: usize, start_byte: u8, delimiter: u8) -> TransportConfig {
        TransportConfig::new("mock", 115_200, max_tx, max_rx, start_byte, delimiter, 5_000)
    }

    #[test]
    fn scalar_write_layout_matches_expected_byte_sequence() {
        let config = mock_config(64, 64, 129, 0);
        let (mut transport, _handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();

        transport.write_data(&10u8, None).unwrap();
        transport.write_data(&451u16, None).unwrap();
        transport.write_data(&123456u32, None).unwrap();
        transport.write_data(&(-10i8), None).unwrap();
        transport.write_data(&(-451i16), None).unwrap();
        transport.write_data(&(-123456i32), None).unwrap();
        transport.write_data(&312.142f32, None).unwrap();
        transport.write_data(&true, None).unwrap();

        assert_eq!(transport.bytes_in_transmission_buffer(), 19);
        assert_eq!(
            &transport.tx_buffer[..19],
            &[10, 195, 1, 64, 226, 1, 0, 246, 61, 254, 192, 29, 254, 255, 45, 18, 156, 67, 1]
        );
    }

    #[test]
    fn end_to_end_round_trip_with_ccitt_false() {
        let config = mock_config(64, 64, 129, 0);
        let (mut transport, handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();

        let payload: [u8; 10] = [1, 2, 3, 0, 0, 6, 0, 8, 0, 0];
        transport.write_data(&payload, None).unwrap();
        assert!(transport.send_data().unwrap());

        let wire_bytes = handle.take_outgoing();
        handle.push_incoming(&wire_bytes);

        assert!(transport.receive_data().unwrap());
        assert_eq!(transport.bytes_in_reception_buffer(), 10);

        let (decoded, consumed): ([u8; 10], usize) = transport.read_data(None).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(consumed, 10);
    }

    #[test]
    fn no_start_byte_returns_false_when_errors_are_not_requested() {
        let config = mock_config(64, 64, 129, 0);
        let (mut transport, handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();
        handle.push_incoming(&[0u8; 20]);

        assert!(!transport.receive_data().unwrap());
    }

    #[test]
    fn no_start_byte_fails_when_errors_are_requested() {
        let config = mock_config(64, 64, 129, 0).with_allow_start_byte_errors(true);
        let (mut transport, handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();
        handle.push_incoming(&[0u8; 20]);

        let err = transport.receive_data().unwrap_err();
        assert!(matches!(
            err,
            TransportError::Receive(ReceiveFault::NoStart { start_byte: 129, .. })
        ));
    }

    #[test]
    fn declared_size_over_max_rx_is_rejected() {
        let config = mock_config(64, 254, 129, 0);
        let (mut transport, handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();
        // start byte, oversized declared size, and filler so the IDLE check
        // sees enough bytes to proceed past it.
        handle.push_incoming(&[129, 255, 0, 0, 0, 0, 0]);

        let err = transport.receive_data().unwrap_err();
        assert!(matches!(
            err,
            TransportError::Receive(ReceiveFault::BadSize { declared: 255, max_rx: 254, .. })
        ));
    }

    #[test]
    fn corrupted_crc_is_detected() {
        let config = mock_config(64, 64, 129, 0);
        let (mut transport, handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();

        transport.write_data(&[1u8, 2, 3], None).unwrap();
        assert!(transport.send_data().unwrap());

        let mut wire_bytes = handle.take_outgoing();
        let last = wire_bytes.len() - 1;
        wire_bytes[last] ^= 0xFF;
        handle.push_incoming(&wire_bytes);

        let err = transport.receive_data().unwrap_err();
        assert!(matches!(err, TransportError::Receive(ReceiveFault::CrcMismatch { .. })));
    }

    #[test]
    fn reset_buffers_zero_the_counters_without_touching_bytes() {
        let config = mock_config(64, 64, 129, 0);
        let (mut transport, _handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();

        transport.write_data(&42u8, None).unwrap();
        assert_eq!(transport.bytes_in_transmission_buffer(), 1);
        transport.reset_transmission_buffer();
        assert_eq!(transport.bytes_in_transmission_buffer(), 0);
        assert_eq!(transport.tx_buffer[0], 42);
    }

    #[test]
    fn overwriting_earlier_bytes_does_not_shrink_bytes_in_tx() {
        let config = mock_config(64, 64, 129, 0);
        let (mut transport, _handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();

        transport.write_data(&1u64, None).unwrap();
        assert_eq!(transport.bytes_in_transmission_buffer(), 8);
        transport.write_data(&1u8, Some(0)).unwrap();
        assert_eq!(transport.bytes_in_transmission_buffer(), 8);
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Telemetry {
        altitude_m: f32,
        velocity_mm_s: i32,
        flags: u8,
        samples: [i16; 3],
    }

    impl WireValue for Telemetry {
        const SIZE: usize = f32::SIZE + i32::SIZE + u8::SIZE + <[i16; 3] as WireValue>::SIZE;

        fn write_into(
            &self,
            buffer: &mut [u8],
            start_index: usize,
        ) -> Result<usize, stp_core::error::WriteError> {
            let index = self.altitude_m.write_into(buffer, start_index)?;
            let index = self.velocity_mm_s.write_into(buffer, index)?;
            let index = self.flags.write_into(buffer, index)?;
            let index = self.samples.write_into(buffer, index)?;
            Ok(index)
        }

        fn read_from(
            buffer: &[u8],
            start_index: usize,
        ) -> Result<(Self, usize), stp_core::error::ReadError> {
            let (altitude_m, index) = f32::read_from(buffer, start_index)?;
            let (velocity_mm_s, index) = i32::read_from(buffer, index)?;
            let (flags, index) = u8::read_from(buffer, index)?;
            let (samples, index) = <[i16; 3]>::read_from(buffer, index)?;
            Ok((
                Self {
                    altitude_m,
                    velocity_mm_s,
                    flags,
                    samples,
                },
                index,
            ))
        }
    }

    #[test]
    fn aggregate_record_round_trips_through_the_wire() {
        let config = mock_config(64, 64, 129, 0);
        let (mut transport, handle) = TransportLayer::new_mock(config, ccitt_false()).unwrap();

        let frame = Telemetry {
            altitude_m: 1042.5,
            velocity_mm_s: -338,
            flags: 0b0000_0011,
            samples: [10, -20, 30],
        };
        transport.write_data(&frame, None).unwrap();
        assert!(transport.send_data().unwrap());

        let wire_bytes = handle.take_outgoing();
        handle.push_incoming(&wire_bytes);
        assert!(transport.receive_data().unwrap());

        let (decoded, _): (Telemetry, usize) = transport.read_data(None).unwrap();
        assert_eq!(decoded, frame);
    }
}
