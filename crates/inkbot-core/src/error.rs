//! Error handling for InkBot
//!
//! Provides error types for the layers below the pipeline orchestrator:
//! - G-Code errors (motion script and coordinate file parsing)
//! - Connection errors (establishing and keeping the device session)
//! - Protocol errors (acknowledgment exchange with the device)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// G-Code error type
///
/// Represents errors related to motion script and coordinate file parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GcodeError {
    /// Invalid syntax on a given line
    #[error("Invalid syntax at line {line_number}: {reason}")]
    InvalidSyntax {
        /// The 1-based line number where the syntax error occurred.
        line_number: u32,
        /// The reason for the syntax error.
        reason: String,
    },

    /// File contained no header row
    #[error("Empty file: {reason}")]
    EmptyFile {
        /// Which file or stream was empty.
        reason: String,
    },
}

/// Connection error type
///
/// Represents failures to establish or keep the TCP session with the device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectionError {
    /// Failed to open the session
    #[error("Failed to connect to {address}: {reason}")]
    FailedToConnect {
        /// The device address.
        address: String,
        /// The reason the connection failed.
        reason: String,
    },

    /// Connection attempt timed out
    #[error("Connection to {address} timed out after {timeout_ms}ms")]
    ConnectionTimeout {
        /// The device address.
        address: String,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Address could not be resolved
    #[error("Invalid device address: {address}")]
    InvalidAddress {
        /// The address that failed to resolve.
        address: String,
    },

    /// Connection lost while sending
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },
}

/// Protocol error type
///
/// Represents a broken send/acknowledge exchange with the device.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// No acknowledgment arrived within the configured timeout
    #[error("No acknowledgment for record {record_index} after {timeout_ms}ms")]
    AckTimeout {
        /// 0-based index of the unacknowledged record.
        record_index: usize,
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The device closed the session instead of acknowledging
    #[error("Device closed the connection before acknowledging record {record_index}")]
    MissingAck {
        /// 0-based index of the unacknowledged record.
        record_index: usize,
    },

    /// Failed to read an acknowledgment
    #[error("Failed to read acknowledgment for record {record_index}: {reason}")]
    ReadFailed {
        /// 0-based index of the record.
        record_index: usize,
        /// The underlying read failure.
        reason: String,
    },

    /// Transport used out of order
    #[error("Invalid transport state transition from {current} to {requested}")]
    InvalidStateTransition {
        /// The current state name.
        current: String,
        /// The requested state name.
        requested: String,
    },
}

/// Main error type for InkBot
///
/// A unified error type for the parsing and transport layers.
#[derive(Error, Debug)]
pub enum Error {
    /// G-Code error
    #[error(transparent)]
    Gcode(#[from] GcodeError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Protocol error
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Protocol(ProtocolError::AckTimeout { .. })
                | Error::Connection(ConnectionError::ConnectionTimeout { .. })
        )
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a protocol error
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    /// Check if this is a G-Code error
    pub fn is_gcode_error(&self) -> bool {
        matches!(self, Error::Gcode(_))
    }

    /// Check if the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::AckTimeout {
            record_index: 0,
            timeout_ms: 250,
        };
        assert_eq!(
            err.to_string(),
            "No acknowledgment for record 0 after 250ms"
        );

        let err = ProtocolError::MissingAck { record_index: 7 };
        assert_eq!(
            err.to_string(),
            "Device closed the connection before acknowledging record 7"
        );
    }

    #[test]
    fn test_connection_error_display() {
        let err = ConnectionError::FailedToConnect {
            address: "192.168.125.1:1025".to_string(),
            reason: "refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to 192.168.125.1:1025: refused"
        );
    }

    #[test]
    fn test_error_classification() {
        let err: Error = ProtocolError::AckTimeout {
            record_index: 1,
            timeout_ms: 10,
        }
        .into();
        assert!(err.is_timeout());
        assert!(err.is_protocol_error());
        assert!(!err.is_connection_error());

        let err: Error = ConnectionError::ConnectionLost {
            reason: "reset".to_string(),
        }
        .into();
        assert!(err.is_connection_error());
        assert!(!err.is_timeout());

        assert!(Error::Cancelled.is_cancelled());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: missing");
    }
}
