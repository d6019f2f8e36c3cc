//! Narrow serial port abstraction the transport layer drives.
//!
//! [`SerialPort`] is the seam the framing state machine is generic over:
//! `SerialDevice` wraps a real OS device via the `serialport` crate, and
//! [`crate::mock_port::MockSerialPort`] backs the same interface with
//! in-memory byte queues for tests.

use std::time::Duration;

/// The interface the transport layer needs from a serial link.
///
/// `bytes_available` must be non-blocking; `read` returns up to `buf.len()`
/// bytes without blocking longer than the underlying driver's smallest
/// quantum; `write` transmits all of `buf` synchronously from the caller's
/// perspective.
pub trait SerialPort {
    /// Number of bytes immediately readable without blocking.
    fn bytes_available(&mut self) -> std::io::Result<usize>;

    /// Reads up to `buf.len()` bytes, returning how many were read. May
    /// return fewer than `buf.len()` (including zero) without that being an
    /// error.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Writes all of `buf`.
    fn write(&mut self, buf: &[u8]) -> std::io::Result<()>;
}

/// A real OS serial device, opened via the `serialport` crate.
pub struct SerialDevice {
    inner: Box<dyn serialport::SerialPort>,
}

impl SerialDevice {
    /// Opens `port_name` at `baud_rate`, toggling DTR once settled so
    /// microcontrollers that reset on DTR assertion have time to boot
    /// before the first packet is sent.
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        settle_delay: Duration,
    ) -> anyhow::Result<Self> {
        let mut inner = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(10))
            .open()?;
        inner.write_data_terminal_ready(true)?;
        if !settle_delay.is_zero() {
            std::thread::sleep(settle_delay);
        }
        Ok(Self { inner })
    }
}

impl SerialPort for SerialDevice {
    fn bytes_available(&mut self) -> std::io::Result<usize> {
        self.inner
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(std::io::Error::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.inner.write_all(buf)
    }
}
