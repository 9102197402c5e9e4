//! # InkBot CAM Tools
//!
//! Turns a bitmap into pen strokes and the strokes into a motion script.
//!
//! - **Rasterizer**: grayscale, resize to the working area, binarize to an ink mask
//! - **Scanline Vectorizer**: zigzag row scan, one straight stroke per ink run
//! - **Motion Script Writer**: G-code serialization of the strokes

pub mod error;
pub mod motion_script;
pub mod rasterizer;
pub mod scanline;

pub use error::{CamToolError, CamToolResult, ParameterError};
pub use motion_script::{to_script_precision, MotionScript, MotionScriptWriter, PREAMBLE};
pub use rasterizer::{BinaryMask, RasterParameters, Rasterizer};
pub use scanline::{ScanDirection, ScanlineParameters, ScanlineVectorizer};
