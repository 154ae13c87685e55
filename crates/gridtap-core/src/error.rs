//! Unified error types for the gridtap ecosystem
//!
//! This module provides a common error type [`PlanError`] that can represent
//! errors from any part of the system. Domain-specific failures convert into
//! `PlanError` for uniform handling at API boundaries.
//!
//! Note that most of the planner itself is deliberately infallible: missing
//! references, unreachable graph regions, and degenerate geometry all degrade
//! to "no result for this entity" rather than an error (see the diagnostics
//! module). `PlanError` covers the genuinely fallible edges: I/O, parsing,
//! and input validation.

use thiserror::Error;

/// Unified error type for all gridtap operations.
#[derive(Error, Debug)]
pub enum PlanError {
    /// I/O errors (file access etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Dangling id references between nodes, links, and stations
    #[error("Reference error: {0}")]
    Reference(String),

    /// Geometry errors (malformed coordinates etc.)
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using PlanError.
pub type PlanResult<T> = Result<T, PlanError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for PlanError {
    fn from(err: anyhow::Error) -> Self {
        PlanError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for PlanError {
    fn from(s: String) -> Self {
        PlanError::Other(s)
    }
}

impl From<&str> for PlanError {
    fn from(s: &str) -> Self {
        PlanError::Other(s.to_string())
    }
}

// JSON parsing errors
impl From<serde_json::Error> for PlanError {
    fn from(err: serde_json::Error) -> Self {
        PlanError::Parse(err.to_string())
    }
}
