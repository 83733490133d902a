//! Domain-specific error types and error handling.

mod types;

pub use types::{BookingError, ValidationError};

use std::fmt::Display;
use thiserror::Error;

/// Core domain errors surfaced by every service operation
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Resource not found: {resource} {id}")]
    NotFound { resource: String, id: String },

    #[error("Unauthorized: {action}")]
    Unauthorized { action: String },

    #[error("Concurrency conflict: {message}")]
    ConcurrencyConflict { message: String },

    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Booking(#[from] BookingError),
}

impl DomainError {
    /// Shorthand for a missing entity
    pub fn not_found(resource: impl Into<String>, id: impl Display) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for an authorization failure
    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Unauthorized {
            action: action.into(),
        }
    }

    /// Stable machine-readable code for callers that map errors to a transport
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Unauthorized { .. } => "UNAUTHORIZED",
            DomainError::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            DomainError::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Validation(err) => err.code(),
            DomainError::Booking(err) => err.code(),
        }
    }

    /// Whether resubmitting the same request may succeed.
    ///
    /// The core never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::ConcurrencyConflict { .. } | DomainError::StorageUnavailable { .. }
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests;
