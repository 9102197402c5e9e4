//! # InkBot Communication
//!
//! TCP transport to the drawing device. Records are sent one at a time as
//! `"x y z"` text and each waits for the device's acknowledgment.

pub mod communication;
pub mod message;
pub mod probe;
pub mod transport;

pub use communication::{tcp::device_address, DeviceLink, TcpLink};
pub use message::{decode_ack, CommandMessage, SentinelRemap, ACK_BUFFER_SIZE, TERMINATION_TOKEN};
pub use probe::{probe_device, ProbeReport};
pub use transport::{
    RobotTransport, TransferEvent, TransferReport, TransportConfig, TransportState,
    DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_HOST, DEFAULT_IO_TIMEOUT, DEFAULT_PORT,
};
