//! Image Rasterizer
//!
//! Loads a bitmap, reduces it to grayscale, resizes it to the square working
//! area and binarizes it into an ink mask. With inversion enabled (the
//! default) dark pixels become ink.

use crate::error::{CamToolError, CamToolResult, ParameterError};
use image::{DynamicImage, GrayImage};
use inkbot_core::WORK_AREA_RESOLUTION;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Square grid of ink flags, indexed by `(column, row)` with row 0 at the top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    size: u32,
    cells: Vec<bool>,
}

impl BinaryMask {
    /// Create a mask with no ink
    pub fn empty(size: u32) -> Self {
        Self::filled(size, false)
    }

    /// Create a mask where every cell has the same value
    pub fn filled(size: u32, ink: bool) -> Self {
        Self {
            size,
            cells: vec![ink; (size as usize) * (size as usize)],
        }
    }

    /// Build a mask by evaluating `f(column, row)` for every cell
    pub fn from_fn<F>(size: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut cells = Vec::with_capacity((size as usize) * (size as usize));
        for row in 0..size {
            for col in 0..size {
                cells.push(f(col, row));
            }
        }
        Self { size, cells }
    }

    /// Side length in cells
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whether the cell holds ink; out-of-range cells are never ink
    pub fn is_ink(&self, col: u32, row: u32) -> bool {
        if col >= self.size || row >= self.size {
            return false;
        }
        self.cells[self.index(col, row)]
    }

    /// Set a single cell
    pub fn set(&mut self, col: u32, row: u32, ink: bool) {
        if col < self.size && row < self.size {
            let idx = self.index(col, row);
            self.cells[idx] = ink;
        }
    }

    /// All cells of one row, left to right
    pub fn row(&self, row: u32) -> &[bool] {
        let start = (row as usize) * (self.size as usize);
        &self.cells[start..start + self.size as usize]
    }

    /// Number of ink cells
    pub fn ink_count(&self) -> usize {
        self.cells.iter().filter(|&&ink| ink).count()
    }

    fn index(&self, col: u32, row: u32) -> usize {
        (row as usize) * (self.size as usize) + col as usize
    }
}

/// Rasterization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterParameters {
    /// Side length of the square working area in pixels
    pub resolution: u32,
    /// Binarization threshold (0-255)
    pub threshold: u8,
    /// Treat dark pixels as ink
    pub invert: bool,
}

impl Default for RasterParameters {
    fn default() -> Self {
        Self {
            resolution: WORK_AREA_RESOLUTION,
            threshold: 128,
            invert: true,
        }
    }
}

/// Converts images into binary ink masks
#[derive(Debug, Clone)]
pub struct Rasterizer {
    params: RasterParameters,
}

impl Rasterizer {
    /// Create a rasterizer, rejecting an empty working area
    pub fn new(params: RasterParameters) -> CamToolResult<Self> {
        if params.resolution == 0 {
            return Err(ParameterError::InvalidDimensions(
                "working resolution must be at least 1 pixel".to_string(),
            )
            .into());
        }
        Ok(Self { params })
    }

    /// Parameters in use
    pub fn params(&self) -> &RasterParameters {
        &self.params
    }

    /// Load and rasterize an image file
    pub fn rasterize_file<P: AsRef<Path>>(&self, path: P) -> CamToolResult<BinaryMask> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|e| {
            tracing::warn!("Failed to load image {}: {}", path.display(), e);
            CamToolError::Decode(format!("{}: {}", path.display(), e))
        })?;
        tracing::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        Ok(self.rasterize_image(&img))
    }

    /// Rasterize an encoded image held in memory
    pub fn rasterize_bytes(&self, bytes: &[u8]) -> CamToolResult<BinaryMask> {
        let img = image::load_from_memory(bytes)?;
        Ok(self.rasterize_image(&img))
    }

    /// Rasterize an already decoded image
    pub fn rasterize_image(&self, img: &DynamicImage) -> BinaryMask {
        let gray = img.to_luma8();
        let resized = image::imageops::resize(
            &gray,
            self.params.resolution,
            self.params.resolution,
            image::imageops::FilterType::Triangle,
        );
        self.binarize(&resized)
    }

    /// Threshold a grayscale image that already has the working size
    fn binarize(&self, gray: &GrayImage) -> BinaryMask {
        let threshold = self.params.threshold;
        let invert = self.params.invert;
        let mask = BinaryMask::from_fn(self.params.resolution, |col, row| {
            let intensity = gray.get_pixel(col, row).0[0];
            if invert {
                intensity <= threshold
            } else {
                intensity > threshold
            }
        });
        tracing::debug!(
            "Rasterized {}x{} mask with {} ink pixels",
            mask.size(),
            mask.size(),
            mask.ink_count()
        );
        mask
    }
}
