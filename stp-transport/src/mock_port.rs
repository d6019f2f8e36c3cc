//! In-memory loopback pair implementing [`SerialPort`] for tests.
//!
//! An explicit pair of types rather than a boolean test-mode flag threaded
//! through the real constructor: [`MockSerialPort`] is the end the
//! `TransportLayer` owns, and [`MockDeviceHandle`] is the end test code holds
//! to inject bytes the transport will read, and to inspect bytes the
//! transport has written.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Link {
    /// Bytes the device has sent that the transport hasn't read yet.
    to_transport: VecDeque<u8>,
    /// Bytes the transport has written that the device hasn't read yet.
    to_device: VecDeque<u8>,
}

/// The transport-facing end of an in-memory loopback link.
#[derive(Clone)]
pub struct MockSerialPort {
    link: Arc<Mutex<Link>>,
}

/// The test-facing end of an in-memory loopback link.
#[derive(Clone)]
pub struct MockDeviceHandle {
    link: Arc<Mutex<Link>>,
}

impl MockSerialPort {
    /// Builds a connected `(transport end, device end)` pair.
    pub fn pair() -> (Self, MockDeviceHandle) {
        let link = Arc::new(Mutex::new(Link::default()));
        (
            Self { link: link.clone() },
            MockDeviceHandle { link },
        )
    }
}

impl super::serial_port::SerialPort for MockSerialPort {
    fn bytes_available(&mut self) -> std::io::Result<usize> {
        Ok(self.link.lock().unwrap().to_transport.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut link = self.link.lock().unwrap();
        let n = buf.len().min(link.to_transport.len());
        for slot in buf.iter_mut().take(n) {
            *slot = link.to_transport.pop_front().unwrap();
        }
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.link.lock().unwrap().to_device.extend(buf.iter().copied());
        Ok(())
    }
}

impl MockDeviceHandle {
    /// Queues `bytes` to be read by the transport's next `bytes_available`/
    /// `read` calls, as if a peer device had just sent them.
    pub fn push_incoming(&self, bytes: &[u8]) {
        self.link.lock().unwrap().to_transport.extend(bytes.iter().copied());
    }

    /// Drains and returns every byte the transport has written so far.
    pub fn take_outgoing(&self) -> Vec<u8> {
        self.link.lock().unwrap().to_device.drain(..).collect()
    }

    /// Number of bytes the transport has written that haven't been drained.
    pub fn outgoing_len(&self) -> usize {
        self.link.lock().unwrap().to_device.len()
    }
}
