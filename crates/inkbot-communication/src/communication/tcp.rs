//! TCP device link
//!
//! Blocking `std::net::TcpStream` wrapper with optional connect and write
//! timeouts. Read timeouts are applied per receive call.

use super::DeviceLink;
use inkbot_core::{ConnectionError, Error, Result};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Format a host and port as a connectable address
pub fn device_address(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Resolve `host:port` to the first socket address
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let address = device_address(host, port);
    let resolved = address
        .to_socket_addrs()
        .map_err(|_| ConnectionError::InvalidAddress {
            address: address.clone(),
        })?
        .next();
    resolved.ok_or_else(|| Error::from(ConnectionError::InvalidAddress { address }))
}

/// Open a TCP stream, honouring an optional connect timeout
pub(crate) fn open_stream(addr: SocketAddr, connect_timeout: Option<Duration>) -> Result<TcpStream> {
    let address = addr.to_string();
    let stream = match connect_timeout {
        Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
        None => TcpStream::connect(addr),
    };
    stream.map_err(|e| -> Error {
        warn!("Failed to connect to {}: {}", address, e);
        match (e.kind(), connect_timeout) {
            (io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock, Some(timeout)) => {
                ConnectionError::ConnectionTimeout {
                    address,
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into()
            }
            _ => ConnectionError::FailedToConnect {
                address,
                reason: e.to_string(),
            }
            .into(),
        }
    })
}

/// A connected TCP link to the device
pub struct TcpLink {
    stream: TcpStream,
    peer: String,
}

impl TcpLink {
    /// Connect to the device
    pub fn connect(
        host: &str,
        port: u16,
        connect_timeout: Option<Duration>,
        write_timeout: Option<Duration>,
    ) -> Result<Self> {
        let addr = resolve(host, port)?;
        info!("Connecting to {}", addr);
        let stream = open_stream(addr, connect_timeout)?;
        stream
            .set_write_timeout(write_timeout)
            .map_err(|e| ConnectionError::FailedToConnect {
                address: addr.to_string(),
                reason: e.to_string(),
            })?;
        // Messages are tiny and unframed; send each one immediately.
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to disable Nagle on {}: {}", addr, e);
        }
        debug!("Connected to {}", addr);

        Ok(Self {
            stream,
            peer: addr.to_string(),
        })
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Self {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        Self { stream, peer }
    }
}

impl DeviceLink for TcpLink {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        trace!("Sending {} bytes to {}", data.len(), self.peer);
        self.stream.write_all(data)?;
        self.stream.flush()
    }

    fn receive(&mut self, buf: &mut [u8], timeout: Option<Duration>) -> io::Result<usize> {
        // A zero read timeout is rejected by the OS layer.
        let timeout = timeout.map(|t| t.max(Duration::from_millis(1)));
        self.stream.set_read_timeout(timeout)?;
        let n = self.stream.read(buf)?;
        trace!("Received {} bytes from {}", n, self.peer);
        Ok(n)
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e),
        }
    }
}
