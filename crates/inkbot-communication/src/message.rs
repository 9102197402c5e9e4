//! Wire messages of the drawing device protocol
//!
//! One record is sent as `"<x> <y> <z>"` in ASCII with no terminator. The
//! device answers each record with arbitrary text; after the last record the
//! literal [`TERMINATION_TOKEN`] is sent and not acknowledged.

use inkbot_core::CoordinateRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sent after the final record
pub const TERMINATION_TOKEN: &str = "done";

/// Size of the acknowledgment read buffer
pub const ACK_BUFFER_SIZE: usize = 1024;

/// Substitution applied to z before transmission
///
/// The device treats `to` as its pulled-back height; scripts use `from`
/// (the pen-up height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentinelRemap {
    pub from: i64,
    pub to: i64,
}

impl Default for SentinelRemap {
    fn default() -> Self {
        Self { from: 5, to: 3 }
    }
}

impl SentinelRemap {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Apply the remap to one record
    pub fn apply(&self, record: CoordinateRecord) -> CoordinateRecord {
        if record.z == self.from {
            record.with_z(self.to)
        } else {
            record
        }
    }
}

/// One record as transmitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandMessage {
    pub record: CoordinateRecord,
}

impl CommandMessage {
    /// Build the message for a record, applying the remap
    pub fn new(record: CoordinateRecord, remap: &SentinelRemap) -> Self {
        Self {
            record: remap.apply(record),
        }
    }

    /// Encoded payload
    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for CommandMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.record.x, self.record.y, self.record.z)
    }
}

/// Decode an acknowledgment, replacing invalid UTF-8
pub fn decode_ack(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_without_terminator() {
        let msg = CommandMessage::new(CoordinateRecord::new(12, -4, 0), &SentinelRemap::default());
        assert_eq!(msg.encode(), b"12 -4 0".to_vec());
    }

    #[test]
    fn test_remap_only_touches_sentinel() {
        let remap = SentinelRemap::default();
        assert_eq!(remap.apply(CoordinateRecord::new(1, 2, 5)), CoordinateRecord::new(1, 2, 3));
        assert_eq!(remap.apply(CoordinateRecord::new(5, 5, 0)), CoordinateRecord::new(5, 5, 0));
        assert_eq!(remap.apply(CoordinateRecord::new(0, 0, 3)), CoordinateRecord::new(0, 0, 3));
    }

    #[test]
    fn test_decode_ack_is_lossy() {
        assert_eq!(decode_ack(b"ok"), "ok");
        assert_eq!(decode_ack(&[0x6f, 0xff, 0x6b]), "o\u{fffd}k");
    }
}
