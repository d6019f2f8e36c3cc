//! The framing state machine, serial port abstraction, and per-byte timeout
//! handling for the serial transport layer. Built on [`stp_core`]'s codec and
//! marshalling primitives; this crate never defines its own wire format, it
//! only drives bytes through the one `stp_core` describes.
//!
//! A typical caller constructs a [`config::TransportConfig`], validates it by
//! building a [`transport::TransportLayer`] (real device via
//! [`serial_port::SerialDevice`], or an in-memory loopback via
//! [`mock_port::MockSerialPort`] for tests), and then drives the
//! `write_data → send_data → … → receive_data → read_data` sequence described
//! in the crate's top-level documentation.

pub mod config;
pub mod error;
pub mod mock_port;
pub mod ports;
pub mod serial_port;
pub mod timer;
pub mod transport;

pub use config::TransportConfig;
pub use error::{ConfigError, ReadDataError, ReceiveFault, TransportError, WriteDataError};
pub use mock_port::{MockDeviceHandle, MockSerialPort};
pub use ports::{PortInfo, list_available_ports};
pub use serial_port::{SerialDevice, SerialPort};
pub use timer::MicrosecondTimer;
pub use transport::TransportLayer;
