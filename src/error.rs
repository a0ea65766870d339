//! Error taxonomy shared across the crate.
//!
//! Quota denial is deliberately absent here: a denied run is an expected
//! control-flow result (`QuotaDecision::Denied`), not a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the rate-limit table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimitsError {
    /// The requested model has no quota entry. Proceeding without quota
    /// knowledge could violate the provider's real limits, so this is fatal.
    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

/// Provider-side failures, split by retry eligibility
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network errors, timeouts, 5xx and provider rate-limit signals.
    /// Retried with bounded exponential backoff.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// Authentication failures, invalid requests, malformed responses.
    /// Never retried.
    #[error("permanent provider error: {0}")]
    Permanent(String),
}

/// Generated content or front matter failed a structural check
#[derive(Debug, Error, PartialEq, Eq)]
#[error("validation failed: {0}")]
pub struct ValidationError(pub String);

/// Errors from the post writer
#[derive(Debug, Error)]
pub enum WriteError {
    /// The derived path already exists. Benign: the run is idempotent for
    /// that time slot and existing content is never overwritten.
    #[error("post already exists: {0}")]
    Collision(PathBuf),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
