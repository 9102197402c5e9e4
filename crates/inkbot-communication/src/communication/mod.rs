//! Device links
//!
//! A [`DeviceLink`] is one exclusively owned byte channel to the drawing
//! device. The transport speaks the record/acknowledgment protocol on top of
//! it; tests substitute in-memory links.

pub mod tcp;

pub use tcp::TcpLink;

use std::io;
use std::time::Duration;

/// Low-level byte channel to the device
pub trait DeviceLink: Send {
    /// Write all bytes of one message
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read whatever the device sent, waiting at most `timeout`
    ///
    /// Returns `Ok(0)` when the peer closed the connection and an error of
    /// kind `WouldBlock` or `TimedOut` when nothing arrived in time.
    fn receive(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> io::Result<usize>;

    /// Human readable peer address
    fn peer(&self) -> String;

    /// Release the underlying connection
    fn close(&mut self) -> io::Result<()>;
}

impl<L: DeviceLink + ?Sized> DeviceLink for Box<L> {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).send(data)
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> io::Result<usize> {
        (**self).receive(buf, timeout)
    }

    fn peer(&self) -> String {
        (**self).peer()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Whether a read error only means "nothing yet"
pub(crate) fn is_wait_expired(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
