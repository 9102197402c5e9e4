//! Record transport to the drawing device
//!
//! The transport owns one link for the duration of a transfer and moves
//! through `Disconnected -> Connected -> Streaming -> Terminating -> Closed`.
//! Any error leaves it in `Failed`. Exactly one record is in flight at a
//! time: send, then block for the acknowledgment before the next send.

use crate::communication::{is_wait_expired, DeviceLink, TcpLink};
use crate::message::{decode_ack, CommandMessage, SentinelRemap, ACK_BUFFER_SIZE, TERMINATION_TOKEN};
use inkbot_core::{CancelToken, ConnectionError, CoordinateRecord, Error, ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default device host
pub const DEFAULT_HOST: &str = "192.168.125.1";

/// Default device port
pub const DEFAULT_PORT: u16 = 1025;

/// Default number of records between progress checkpoints
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 100;

/// Lifecycle of one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// No link open
    Disconnected,
    /// Link open, nothing sent yet
    Connected,
    /// Sending records
    Streaming,
    /// Sending the termination token
    Terminating,
    /// Link released after a complete transfer
    Closed,
    /// Link released after an error
    Failed,
}

impl TransportState {
    /// Check if a transition from this state to `target` is valid.
    ///
    /// - Disconnected → Connected, Failed
    /// - Connected → Streaming, Failed
    /// - Streaming → Terminating, Failed
    /// - Terminating → Closed, Failed
    /// - Closed, Failed → Disconnected (new transfer)
    pub fn can_transition_to(&self, target: TransportState) -> bool {
        use TransportState::*;
        matches!(
            (self, target),
            (Disconnected, Connected | Failed)
                | (Connected, Streaming | Failed)
                | (Streaming, Terminating | Failed)
                | (Terminating, Closed | Failed)
                | (Closed | Failed, Disconnected)
        )
    }

    /// Whether the transfer has ended
    pub fn is_finished(&self) -> bool {
        matches!(self, TransportState::Closed | TransportState::Failed)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Streaming => write!(f, "Streaming"),
            Self::Terminating => write!(f, "Terminating"),
            Self::Closed => write!(f, "Closed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Connect, write and acknowledgment timeout unless configured otherwise
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Transport configuration
///
/// Timeouts of `None` wait forever.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
    pub ack_timeout: Option<Duration>,
    /// Records between checkpoints; 0 disables checkpoints
    pub checkpoint_interval: usize,
    pub remap: SentinelRemap,
    /// Granularity of cancellation checks while waiting for an ack
    pub poll_interval: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Some(DEFAULT_IO_TIMEOUT),
            write_timeout: Some(DEFAULT_IO_TIMEOUT),
            ack_timeout: Some(DEFAULT_IO_TIMEOUT),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            remap: SentinelRemap::default(),
            poll_interval: Duration::from_millis(50),
        }
    }
}

impl TransportConfig {
    /// Create a configuration for the given device address
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the acknowledgment timeout
    pub fn with_ack_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the checkpoint interval
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Set the sentinel remap
    pub fn with_remap(mut self, remap: SentinelRemap) -> Self {
        self.remap = remap;
        self
    }

    /// `host:port`
    pub fn address(&self) -> String {
        crate::communication::tcp::device_address(&self.host, self.port)
    }
}

/// Progress notifications emitted during a transfer
#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    Connected { peer: String },
    RecordSent { index: usize, message: String },
    Acknowledged { index: usize, reply: String },
    Checkpoint { records_sent: usize, elapsed: Duration },
    Terminated { records_sent: usize },
}

/// Summary of a completed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReport {
    pub peer: String,
    pub records_sent: usize,
    pub elapsed: Duration,
}

/// Closes the link on every exit path
struct LinkGuard<L: DeviceLink> {
    link: L,
    closed: bool,
}

impl<L: DeviceLink> LinkGuard<L> {
    fn new(link: L) -> Self {
        Self { link, closed: false }
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.link.close() {
            debug!("Error closing link to {}: {}", self.link.peer(), e);
        }
    }
}

impl<L: DeviceLink> Drop for LinkGuard<L> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sends coordinate records to the drawing device
pub struct RobotTransport {
    config: TransportConfig,
    state: TransportState,
}

impl RobotTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            state: TransportState::Disconnected,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, next: TransportState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ProtocolError::InvalidStateTransition {
                current: self.state.to_string(),
                requested: next.to_string(),
            }
            .into());
        }
        debug!("Transport {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Connect over TCP and send every record
    pub fn transfer<F>(
        &mut self,
        records: &[CoordinateRecord],
        cancel: &CancelToken,
        observer: F,
    ) -> Result<TransferReport>
    where
        F: FnMut(TransferEvent),
    {
        self.begin()?;
        if cancel.is_cancelled() {
            self.state = TransportState::Failed;
            return Err(Error::Cancelled);
        }

        let link = TcpLink::connect(
            &self.config.host,
            self.config.port,
            self.config.connect_timeout,
            self.config.write_timeout,
        )
        .inspect_err(|_| self.state = TransportState::Failed)?;

        self.transfer_over(link, records, cancel, observer)
    }

    /// Send every record over an already open link
    ///
    /// The link is closed when this returns, whatever the outcome.
    pub fn transfer_over<L, F>(
        &mut self,
        link: L,
        records: &[CoordinateRecord],
        cancel: &CancelToken,
        mut observer: F,
    ) -> Result<TransferReport>
    where
        L: DeviceLink,
        F: FnMut(TransferEvent),
    {
        self.begin()?;
        let mut guard = LinkGuard::new(link);
        let peer = guard.link.peer();
        self.transition(TransportState::Connected)?;
        info!("Connected to drawing device at {}", peer);
        observer(TransferEvent::Connected { peer: peer.clone() });

        let result = self.stream(&mut guard.link, records, cancel, &mut observer);
        guard.close();

        match result {
            Ok(elapsed) => {
                self.transition(TransportState::Closed)?;
                info!("Transferred {} records to {} in {:?}", records.len(), peer, elapsed);
                Ok(TransferReport {
                    peer,
                    records_sent: records.len(),
                    elapsed,
                })
            }
            Err(e) => {
                self.state = TransportState::Failed;
                if e.is_cancelled() {
                    info!("Transfer to {} cancelled", peer);
                } else {
                    warn!("Transfer to {} failed: {}", peer, e);
                }
                Err(e)
            }
        }
    }

    fn begin(&mut self) -> Result<()> {
        if self.state.is_finished() {
            self.transition(TransportState::Disconnected)?;
        }
        if self.state != TransportState::Disconnected {
            return Err(ProtocolError::InvalidStateTransition {
                current: self.state.to_string(),
                requested: TransportState::Connected.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn stream<L, F>(
        &mut self,
        link: &mut L,
        records: &[CoordinateRecord],
        cancel: &CancelToken,
        observer: &mut F,
    ) -> Result<Duration>
    where
        L: DeviceLink,
        F: FnMut(TransferEvent),
    {
        self.transition(TransportState::Streaming)?;
        let started = Instant::now();

        for (index, record) in records.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let message = CommandMessage::new(*record, &self.config.remap);
            link.send(&message.encode())
                .map_err(|e| ConnectionError::ConnectionLost {
                    reason: format!("sending record {}: {}", index, e),
                })?;
            debug!("Sent record {}: {}", index, message);
            observer(TransferEvent::RecordSent {
                index,
                message: message.to_string(),
            });

            let reply = self.await_ack(link, index, cancel)?;
            debug!("Ack {}: {}", index, reply);
            observer(TransferEvent::Acknowledged { index, reply });

            let sent = index + 1;
            if self.config.checkpoint_interval > 0 && sent % self.config.checkpoint_interval == 0 {
                let elapsed = started.elapsed();
                info!("{} records sent, {:.1}s elapsed", sent, elapsed.as_secs_f64());
                observer(TransferEvent::Checkpoint {
                    records_sent: sent,
                    elapsed,
                });
            }
        }

        self.transition(TransportState::Terminating)?;
        link.send(TERMINATION_TOKEN.as_bytes())
            .map_err(|e| ConnectionError::ConnectionLost {
                reason: format!("sending termination: {}", e),
            })?;
        observer(TransferEvent::Terminated {
            records_sent: records.len(),
        });
        Ok(started.elapsed())
    }

    fn await_ack<L: DeviceLink>(
        &self,
        link: &mut L,
        record_index: usize,
        cancel: &CancelToken,
    ) -> Result<String> {
        let started = Instant::now();
        let mut buf = [0u8; ACK_BUFFER_SIZE];
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let wait = match self.config.ack_timeout {
                Some(limit) => {
                    let remaining = limit.saturating_sub(started.elapsed());
                    if remaining.is_zero() {
                        return Err(ProtocolError::AckTimeout {
                            record_index,
                            timeout_ms: limit.as_millis() as u64,
                        }
                        .into());
                    }
                    remaining.min(self.config.poll_interval)
                }
                None => self.config.poll_interval,
            };

            match link.receive(&mut buf, Some(wait)) {
                Ok(0) => return Err(ProtocolError::MissingAck { record_index }.into()),
                Ok(n) => return Ok(decode_ack(&buf[..n])),
                Err(e) if is_wait_expired(&e) => continue,
                Err(e) => {
                    return Err(ProtocolError::ReadFailed {
                        record_index,
                        reason: e.to_string(),
                    }
                    .into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        use TransportState::*;
        assert!(Disconnected.can_transition_to(Connected));
        assert!(Connected.can_transition_to(Streaming));
        assert!(Streaming.can_transition_to(Terminating));
        assert!(Terminating.can_transition_to(Closed));
        assert!(Streaming.can_transition_to(Failed));
        assert!(Closed.can_transition_to(Disconnected));

        assert!(!Disconnected.can_transition_to(Streaming));
        assert!(!Connected.can_transition_to(Terminating));
        assert!(!Closed.can_transition_to(Streaming));
        assert!(!Failed.can_transition_to(Closed));
    }

    #[test]
    fn test_invalid_transition_is_error() {
        let mut transport = RobotTransport::new(TransportConfig::default());
        let err = transport.transition(TransportState::Terminating).unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::InvalidStateTransition { .. })
        ));
        assert_eq!(transport.state(), TransportState::Disconnected);
    }

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.address(), "192.168.125.1:1025");
        assert_eq!(config.checkpoint_interval, 100);
        assert_eq!(config.remap, SentinelRemap::new(5, 3));
        assert!(config.ack_timeout.is_none());
    }
}
