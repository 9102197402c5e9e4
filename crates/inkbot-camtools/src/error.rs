//! Error types for the CAM tools crate.
//!
//! This module provides structured error types for image loading,
//! parameter validation, and motion script export.

use std::io;
use thiserror::Error;

/// Errors that can occur during CAM tool operations.
#[derive(Error, Debug)]
pub enum CamToolError {
    /// The image could not be read or decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// A parameter validation error occurred.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),
}

impl From<image::ImageError> for CamToolError {
    fn from(err: image::ImageError) -> Self {
        CamToolError::Decode(err.to_string())
    }
}

/// Errors related to CAM tool parameter validation.
#[derive(Error, Debug)]
pub enum ParameterError {
    /// A parameter value is out of the valid range.
    #[error("Parameter '{name}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A parameter value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// Dimensions are invalid (zero or negative).
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
}

/// Result type alias for CAM tool operations.
pub type CamToolResult<T> = Result<T, CamToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cam_tool_error_display() {
        let err = CamToolError::Decode("unsupported format".to_string());
        assert_eq!(err.to_string(), "Failed to decode image: unsupported format");
    }

    #[test]
    fn test_parameter_error_display() {
        let err = ParameterError::OutOfRange {
            name: "scale".to_string(),
            value: -1.0,
            min: 0.0,
            max: f64::MAX,
        };
        assert!(err
            .to_string()
            .starts_with("Parameter 'scale' out of range: -1 (valid: 0.."));

        let err = ParameterError::InvalidValue {
            name: "row_step".to_string(),
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for 'row_step': must be at least 1"
        );
    }

    #[test]
    fn test_error_conversion() {
        let param_err = ParameterError::InvalidDimensions("0x0".to_string());
        let cam_err: CamToolError = param_err.into();
        assert!(matches!(cam_err, CamToolError::Parameter(_)));

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let cam_err: CamToolError = io_err.into();
        assert!(matches!(cam_err, CamToolError::IoError(_)));
    }
}
