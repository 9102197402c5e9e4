//! Scanline Vectorizer
//!
//! Walks a binary mask row by row in a zigzag pattern and collapses every
//! contiguous run of ink into one straight stroke between the run's first
//! and last pixel. The shape of the run between its extremes is discarded,
//! so a curved or broken-looking run still becomes a single line.
//!
//! Rows are sampled every `row_step` pixels. Mask row 0 is the top of the
//! image and maps to the far edge of the device Y axis.

use crate::error::{CamToolResult, ParameterError};
use crate::rasterizer::BinaryMask;
use inkbot_core::{MotionSegment, PenHeights, Point2};
use serde::{Deserialize, Serialize};

/// Vectorization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanlineParameters {
    /// Physical units per mask pixel
    pub scale: f64,
    /// Pen heights attached to every stroke
    pub pen: PenHeights,
    /// Distance in pixels between sampled rows
    pub row_step: u32,
}

impl Default for ScanlineParameters {
    fn default() -> Self {
        Self {
            scale: 0.3,
            pen: PenHeights::default(),
            row_step: 2,
        }
    }
}

/// Horizontal scan direction of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanDirection {
    LeftToRight,
    RightToLeft,
}

/// Converts ink masks into pen strokes
#[derive(Debug, Clone)]
pub struct ScanlineVectorizer {
    params: ScanlineParameters,
}

impl ScanlineVectorizer {
    /// Create a vectorizer; the scale must be finite and strictly positive
    pub fn new(params: ScanlineParameters) -> CamToolResult<Self> {
        if !params.scale.is_finite() || params.scale <= 0.0 {
            return Err(ParameterError::OutOfRange {
                name: "scale".to_string(),
                value: params.scale,
                min: 0.0,
                max: f64::MAX,
            }
            .into());
        }
        if params.row_step == 0 {
            return Err(ParameterError::InvalidValue {
                name: "row_step".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(Self { params })
    }

    /// Parameters in use
    pub fn params(&self) -> &ScanlineParameters {
        &self.params
    }

    /// Direction used for a given mask row
    ///
    /// The direction flips on every sampled row.
    pub fn direction_for_row(&self, row: u32) -> ScanDirection {
        if (row / self.params.row_step) % 2 == 0 {
            ScanDirection::LeftToRight
        } else {
            ScanDirection::RightToLeft
        }
    }

    /// Convert a mask to strokes
    pub fn vectorize(&self, mask: &BinaryMask) -> Vec<MotionSegment> {
        self.vectorize_with_progress(mask, |_| {})
    }

    /// Convert a mask to strokes, reporting progress in `0.0..=1.0`
    pub fn vectorize_with_progress<F>(
        &self,
        mask: &BinaryMask,
        mut progress_callback: F,
    ) -> Vec<MotionSegment>
    where
        F: FnMut(f32),
    {
        let size = mask.size();
        let mut segments = Vec::new();

        progress_callback(0.0);
        for row in (0..size).step_by(self.params.row_step as usize) {
            if row % 20 == 0 {
                progress_callback(row as f32 / size.max(1) as f32);
            }
            self.scan_row(mask, row, &mut segments);
        }
        progress_callback(1.0);

        tracing::debug!(
            "Vectorized {}x{} mask into {} segments",
            size,
            size,
            segments.len()
        );
        segments
    }

    fn scan_row(&self, mask: &BinaryMask, row: u32, segments: &mut Vec<MotionSegment>) {
        let size = mask.size();
        let columns: Box<dyn Iterator<Item = u32>> = match self.direction_for_row(row) {
            ScanDirection::LeftToRight => Box::new(0..size),
            ScanDirection::RightToLeft => Box::new((0..size).rev()),
        };

        // (first, last) ink pixel of the active run, in scan order
        let mut run: Option<(Point2, Point2)> = None;

        for col in columns {
            if mask.is_ink(col, row) {
                let point = self.to_physical(size, col, row);
                run = Some(match run {
                    Some((first, _)) => (first, point),
                    None => (point, point),
                });
            } else if let Some((first, last)) = run.take() {
                segments.push(MotionSegment::new(first, last, self.params.pen));
            }
        }

        if let Some((first, last)) = run {
            segments.push(MotionSegment::new(first, last, self.params.pen));
        }
    }

    fn to_physical(&self, size: u32, col: u32, row: u32) -> Point2 {
        Point2::new(
            col as f64 * self.params.scale,
            (size - row) as f64 * self.params.scale,
        )
    }
}
