//! # InkBot Core
//!
//! Core types and utilities shared by every InkBot crate: the stroke and
//! coordinate data model, the error hierarchy, and cancellation.

pub mod cancel;
pub mod error;
pub mod types;

pub use cancel::CancelToken;

pub use error::{ConnectionError, Error, GcodeError, ProtocolError, Result};

pub use types::{
    Axis, CoordinateRecord, MotionCommand, MotionKind, MotionSegment, PenHeights, Point2,
};

/// Side length in pixels of the square working area every image is resized to
pub const WORK_AREA_RESOLUTION: u32 = 255;
