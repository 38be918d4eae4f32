use std::fmt;

use anyhow::Error;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ShakeError;

/// Code reported for failures that carry no more specific code.
pub const RENDER_FAILED: &str = "RENDER_FAILED";

#[derive(Debug, Clone)]
pub struct CodedError {
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl CodedError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            ok: false,
            error: ErrorEnvelopeBody {
                code: self.code.to_owned(),
                message: self.message.clone(),
                details: self.details.clone(),
            },
        }
    }
}

impl From<&ShakeError> for CodedError {
    fn from(error: &ShakeError) -> Self {
        let coded = Self::new(error.code(), error.to_string());
        match error {
            ShakeError::InvalidDimensions { width, height } => {
                coded.with_details(json!({ "width": width, "height": height }))
            }
            ShakeError::InvalidParameter { name, reason } => {
                coded.with_details(json!({ "parameter": name, "reason": reason }))
            }
            ShakeError::UnsupportedPixelFormat { detail } => {
                coded.with_details(json!({ "detail": detail }))
            }
        }
    }
}

impl fmt::Display for CodedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CodedError {}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub error: ErrorEnvelopeBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelopeBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// First coded cause in the chain, falling back to a generic render failure.
///
/// When the coded cause is wrapped in context, the message is the full
/// context chain.
pub fn classify_error(error: &Error) -> CodedError {
    let found = error.chain().enumerate().find_map(|(depth, cause)| {
        cause
            .downcast_ref::<CodedError>()
            .cloned()
            .or_else(|| cause.downcast_ref::<ShakeError>().map(CodedError::from))
            .map(|coded| (depth, coded))
    });

    match found {
        Some((0, coded)) => coded,
        Some((_, coded)) => CodedError {
            message: format!("{error:#}"),
            ..coded
        },
        None => CodedError::new(RENDER_FAILED, format!("{error:#}")),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{anyhow, Context};

    use super::*;

    #[test]
    fn shake_errors_keep_their_code_through_context() {
        let result: Result<(), ShakeError> = Err(ShakeError::InvalidDimensions {
            width: 0,
            height: 5,
        });
        let error = result.context("rendering frame 3").expect_err("should fail");

        let coded = classify_error(&error);
        assert_eq!(coded.code, "INVALID_DIMENSIONS");
        assert!(coded.message.starts_with("rendering frame 3: "));
        assert_eq!(coded.details, Some(json!({ "width": 0, "height": 5 })));
    }

    #[test]
    fn root_coded_errors_keep_their_own_message() {
        let error = anyhow!(CodedError::new("SOURCE_NOT_FOUND", "source image does not exist"));
        let coded = classify_error(&error);
        assert_eq!(coded.code, "SOURCE_NOT_FOUND");
        assert_eq!(coded.message, "source image does not exist");
    }

    #[test]
    fn uncoded_errors_fall_back_to_render_failed() {
        let coded = classify_error(&anyhow!("disk on fire"));
        assert_eq!(coded.code, RENDER_FAILED);
        assert_eq!(coded.message, "disk on fire");
    }

    #[test]
    fn envelope_serializes_without_empty_details() {
        let value = serde_json::to_value(CodedError::new("X", "y").envelope())
            .expect("envelope should serialize");
        assert_eq!(
            value,
            json!({ "ok": false, "error": { "code": "X", "message": "y" } })
        );
    }
}
