//! Device reachability probe

use crate::communication::tcp::{open_stream, resolve};
use inkbot_core::Result;
use serde::{Deserialize, Serialize};
use std::net::Shutdown;
use std::time::{Duration, Instant};

/// Result of a successful probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub address: String,
    /// Time taken by the TCP connect
    pub latency: Duration,
}

/// Check that the device accepts TCP connections
///
/// Opens and immediately closes one connection; nothing is sent.
pub fn probe_device(host: &str, port: u16, timeout: Duration) -> Result<ProbeReport> {
    let addr = resolve(host, port)?;
    let started = Instant::now();
    let stream = open_stream(addr, Some(timeout))?;
    let latency = started.elapsed();
    let _ = stream.shutdown(Shutdown::Both);
    tracing::info!("{} reachable in {:?}", addr, latency);
    Ok(ProbeReport {
        address: addr.to_string(),
        latency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_probe_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let report = probe_device("127.0.0.1", port, Duration::from_secs(2)).unwrap();
        assert_eq!(report.address, format!("127.0.0.1:{}", port));
    }

    #[test]
    fn test_probe_closed_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = probe_device("127.0.0.1", port, Duration::from_secs(2)).unwrap_err();
        assert!(err.is_connection_error());
    }
}
