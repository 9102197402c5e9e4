//! # InkBot G-Code
//!
//! Decoding of motion scripts into coordinate records and the coordinate
//! file format used between the pipeline and the device transport.
//!
//! - [`parser`]: line parser with per-axis carry-forward
//! - [`dedup`]: consecutive-duplicate removal
//! - [`table`]: header plus records, read and written as comma-separated text

pub mod dedup;
pub mod parser;
pub mod table;

pub use dedup::CoordinateDeduplicator;
pub use parser::{round_coordinate, AxisState, CommandParser};
pub use table::{CoordinateHeader, CoordinateTable, FIELD_SEPARATOR};
