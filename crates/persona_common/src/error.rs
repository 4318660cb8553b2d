//! Error taxonomy for the analysis pipeline.
//!
//! Validation errors reach the caller as client errors. Backend errors
//! are absorbed by the orchestrator (mock fallback) and never surface.
//! The parser has no error type at all; it degrades to defaults.

use thiserror::Error;

/// Input-contract violations. Mapped to HTTP 400, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: {0}")]
    MissingField(&'static str),

    #[error("Invalid type: {0}. Must be one of: endpoint, openapi_url, openapi_spec")]
    InvalidType(String),
}

/// Failures talking to the generation backend. Recovered locally via
/// the mock path; callers never see these.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    #[error("backend returned an empty or malformed response")]
    InvalidResponse,
}

/// What an analysis call can fail with at the HTTP boundary.
#[derive(Debug, Clone, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("internal error: {0}")]
    Internal(String),
}
