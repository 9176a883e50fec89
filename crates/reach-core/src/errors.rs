//! Structured error types shared across reach crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`ReachError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (shapes, indices, kinds, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the reach engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ReachError {
    /// Operand shapes incompatible after promotion, or an empty operand.
    #[error("shape error: {0}")]
    ShapeMismatch(ErrorInfo),
    /// Upper bound below lower bound at interval construction.
    #[error("bound order error: {0}")]
    BoundOrder(ErrorInfo),
    /// Interval binary operation between incompatible dimensions.
    #[error("dimension error: {0}")]
    DimensionMismatch(ErrorInfo),
    /// Operation recognized but deliberately unimplemented.
    #[error("not supported: {0}")]
    NotSupported(ErrorInfo),
    /// Randomness and seeding errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl ReachError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            ReachError::ShapeMismatch(info)
            | ReachError::BoundOrder(info)
            | ReachError::DimensionMismatch(info)
            | ReachError::NotSupported(info)
            | ReachError::Rng(info) => info,
        }
    }

    /// Builds a shape mismatch error with the provided code and message.
    pub fn shape_mismatch(code: impl Into<String>, message: impl Into<String>) -> Self {
        ReachError::ShapeMismatch(ErrorInfo::new(code, message))
    }

    /// Builds a bound ordering error with the provided code and message.
    pub fn bound_order(code: impl Into<String>, message: impl Into<String>) -> Self {
        ReachError::BoundOrder(ErrorInfo::new(code, message))
    }

    /// Builds a dimension mismatch error with the provided code and message.
    pub fn dimension_mismatch(code: impl Into<String>, message: impl Into<String>) -> Self {
        ReachError::DimensionMismatch(ErrorInfo::new(code, message))
    }

    /// Builds a not-supported error for a recognized but unimplemented operation.
    pub fn not_supported(code: impl Into<String>, message: impl Into<String>) -> Self {
        ReachError::NotSupported(ErrorInfo::new(code, message))
    }

    /// Attaches a context entry to the error payload.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        let attach = |info: ErrorInfo| info.with_context(key, value.to_string());
        match self {
            ReachError::ShapeMismatch(info) => ReachError::ShapeMismatch(attach(info)),
            ReachError::BoundOrder(info) => ReachError::BoundOrder(attach(info)),
            ReachError::DimensionMismatch(info) => ReachError::DimensionMismatch(attach(info)),
            ReachError::NotSupported(info) => ReachError::NotSupported(attach(info)),
            ReachError::Rng(info) => ReachError::Rng(attach(info)),
        }
    }
}
