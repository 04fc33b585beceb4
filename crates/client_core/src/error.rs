//! Failure reasons surfaced to the presentation layer.
//!
//! Every variant renders to a fixed, human-readable sentence. Underlying
//! causes (HTTP status, decode errors) are logged where they happen and never
//! carried in these values.

use thiserror::Error;

/// Local validation failed; no request was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("Please fill in all fields")]
    MissingCredentials,
    #[error("Please log in to view progress")]
    MissingIdentity,
}

/// The request went out but did not produce a usable answer.
///
/// Server rejections and transport faults map to the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Invalid email or password")]
    LoginFailed,
    #[error("Failed to load progress")]
    ProgressUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl FailureReason {
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }
}
