//! Error type shared by every stage of the frame pipeline.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failures for mask extraction, field generation and resampling.
///
/// Every variant is terminal for the frame being computed: the pipeline is
/// pure, so retrying with the same inputs reproduces the same error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShakeError {
    /// Zero-sized image, or dimensions whose pixel count overflows `usize`.
    InvalidDimensions { width: u64, height: u64 },
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
    UnsupportedPixelFormat { detail: String },
}

impl ShakeError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code, used in JSON error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::UnsupportedPixelFormat { .. } => "UNSUPPORTED_PIXEL_FORMAT",
        }
    }
}

impl Display for ShakeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "image dimensions must be positive and addressable, got {width}x{height}"
            ),
            Self::InvalidParameter { name, reason } => {
                write!(f, "invalid parameter '{name}': {reason}")
            }
            Self::UnsupportedPixelFormat { detail } => {
                write!(f, "unsupported pixel format: {detail}")
            }
        }
    }
}

impl Error for ShakeError {}
