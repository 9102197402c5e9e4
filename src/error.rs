//! Pipeline error type
//!
//! Every stage error is folded into one of the kinds a caller can act on.

use inkbot_camtools::{CamToolError, ParameterError};
use inkbot_core::{ConnectionError, ProtocolError};
use inkbot_settings::{ConfigError, SettingsError};
use thiserror::Error;

/// Failure of a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The image could not be read or decoded.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// The scale is not a finite positive number.
    #[error("Invalid scale value: {0}")]
    InvalidScaleValue(String),

    /// Any other unusable setting.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Reading or writing an artifact failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device session could not be opened or was lost.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The acknowledgment exchange broke down.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The caller cancelled the run.
    #[error("Transfer cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Short machine-readable kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::InvalidScaleValue(_) => "invalid_scale",
            Self::Configuration(_) => "configuration",
            Self::Io(_) => "io",
            Self::Connection(_) => "connection",
            Self::Protocol(_) => "protocol",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<CamToolError> for PipelineError {
    fn from(err: CamToolError) -> Self {
        match err {
            CamToolError::Decode(reason) => Self::Decode(reason),
            CamToolError::IoError(e) => Self::Io(e),
            CamToolError::Parameter(ParameterError::OutOfRange { name, value, .. })
                if name == "scale" =>
            {
                Self::InvalidScaleValue(value.to_string())
            }
            CamToolError::Parameter(e) => Self::Configuration(e.to_string()),
        }
    }
}

impl From<inkbot_core::Error> for PipelineError {
    fn from(err: inkbot_core::Error) -> Self {
        use inkbot_core::Error;
        match err {
            Error::Connection(e) => Self::Connection(e),
            Error::Protocol(e) => Self::Protocol(e),
            Error::Io(e) => Self::Io(e),
            Error::Cancelled => Self::Cancelled,
            Error::Gcode(e) => Self::Decode(e.to_string()),
        }
    }
}

impl From<SettingsError> for PipelineError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Config(ConfigError::ValueOutOfRange { key, value })
                if key == "drawing.scale" =>
            {
                Self::InvalidScaleValue(value)
            }
            SettingsError::IoError(e) => Self::Io(e),
            other => Self::Configuration(other.to_string()),
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_parameter_maps_to_invalid_scale() {
        let err: PipelineError = CamToolError::from(ParameterError::OutOfRange {
            name: "scale".to_string(),
            value: -1.0,
            min: 0.0,
            max: f64::MAX,
        })
        .into();
        assert!(matches!(err, PipelineError::InvalidScaleValue(_)));
        assert_eq!(err.kind(), "invalid_scale");
    }

    #[test]
    fn test_core_errors_keep_their_kind() {
        let err: PipelineError = inkbot_core::Error::Cancelled.into();
        assert!(matches!(err, PipelineError::Cancelled));

        let err: PipelineError = inkbot_core::Error::from(ProtocolError::MissingAck {
            record_index: 3,
        })
        .into();
        assert_eq!(err.kind(), "protocol");
        assert_eq!(
            err.to_string(),
            "Device closed the connection before acknowledging record 3"
        );
    }

    #[test]
    fn test_decode_message() {
        let err: PipelineError = CamToolError::Decode("bad png".to_string()).into();
        assert_eq!(err.to_string(), "Failed to decode image: bad png");
    }
}
