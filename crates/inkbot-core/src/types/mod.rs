//! Shared data model.
//!
//! ## Modules
//!
//! - [`motion`]: physical-unit strokes and motion script commands
//! - [`record`]: integer coordinate records streamed to the device

pub mod motion;
pub mod record;

pub use motion::*;
pub use record::*;
