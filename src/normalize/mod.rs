//! Turns the agent's free-text reply into a [`ResearchResponse`].
//!
//! The pipeline is two pure steps: [`strip_fences`] removes a markdown code
//! fence the model may have wrapped its answer in, and [`validate`] parses the
//! result and checks it against [`schema::RESEARCH_SCHEMA`]. Failures are
//! classified by [`ErrorKind`] and always carry the offending text.

mod fence;
pub mod schema;

pub use fence::strip_fences;

use crate::models::ResearchResponse;
use schema::FieldViolation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    MalformedOutput,
    ParseError,
    ValidationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedOutput => "MalformedOutput",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::ValidationError => "ValidationError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Failed to extract JSON from agent output: {output}")]
    MalformedOutput { output: String },

    #[error("Failed to parse JSON from agent output: {message} - Output: {output}")]
    ParseError { message: String, output: String },

    #[error("Failed to validate agent output: {} - Output: {output}", join_violations(.violations))]
    ValidationError {
        violations: Vec<FieldViolation>,
        output: String,
    },
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl NormalizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NormalizeError::MalformedOutput { .. } => ErrorKind::MalformedOutput,
            NormalizeError::ParseError { .. } => ErrorKind::ParseError,
            NormalizeError::ValidationError { .. } => ErrorKind::ValidationError,
        }
    }

    /// The text that failed, after fence stripping.
    pub fn output(&self) -> &str {
        match self {
            NormalizeError::MalformedOutput { output }
            | NormalizeError::ParseError { output, .. }
            | NormalizeError::ValidationError { output, .. } => output,
        }
    }
}

pub fn validate(text: &str) -> Result<ResearchResponse, NormalizeError> {
    let text = text.trim();
    if !text.starts_with('{') || !text.ends_with('}') {
        return Err(NormalizeError::MalformedOutput {
            output: text.to_string(),
        });
    }

    let value: Value = serde_json::from_str(text).map_err(|e| NormalizeError::ParseError {
        message: e.to_string(),
        output: text.to_string(),
    })?;

    // A document that starts with '{' and parses is always an object.
    let Value::Object(object) = value else {
        return Err(NormalizeError::MalformedOutput {
            output: text.to_string(),
        });
    };

    schema::build_response(&object).map_err(|violations| NormalizeError::ValidationError {
        violations,
        output: text.to_string(),
    })
}

/// Fence stripping followed by validation.
pub fn normalize(raw: &str) -> Result<ResearchResponse, NormalizeError> {
    validate(strip_fences(raw))
}
