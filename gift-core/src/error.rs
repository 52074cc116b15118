//! Domain errors, with the Feathers-style fields (name, code, className)
//! the HTTP layer serializes.

use gift_blob::PhotoError;
use serde_json::json;
use thiserror::Error;

/// A convenience result type for gift operations.
pub type GiftResult<T> = std::result::Result<T, GiftError>;

#[derive(Debug, Error)]
pub enum GiftError {
    /// Creation input rejected before any store mutation.
    #[error("{message}")]
    Validation { message: String },

    /// Token absent. Covers "never existed" and "already opened and purged"
    /// identically so token validity history cannot be probed.
    #[error("this gift is no longer available")]
    NotFoundOrExpired,

    /// Record store create/update/delete failure.
    #[error("persistence failure: {message}")]
    Persistence { message: String },

    /// A record was created but not every photo landed; cleanup was
    /// attempted and the creator should retry.
    #[error("gift creation failed partway: {message}")]
    PartialCreation { message: String },

    /// Photo store failure surfaced during creation.
    #[error(transparent)]
    Photo(#[from] PhotoError),
}

impl GiftError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn partial_creation(message: impl Into<String>) -> Self {
        Self::PartialCreation {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GiftError::Validation { .. } => 422,
            GiftError::NotFoundOrExpired => 404,
            GiftError::Persistence { .. }
            | GiftError::PartialCreation { .. }
            | GiftError::Photo(_) => 500,
        }
    }

    /// Feathers error `name` (e.g. "NotFound")
    pub fn name(&self) -> &'static str {
        match self {
            GiftError::Validation { .. } => "Unprocessable",
            GiftError::NotFoundOrExpired => "NotFound",
            GiftError::Persistence { .. }
            | GiftError::PartialCreation { .. }
            | GiftError::Photo(_) => "GeneralError",
        }
    }

    /// Feathers error `className` (commonly kebab-cased)
    pub fn class_name(&self) -> &'static str {
        match self {
            GiftError::Validation { .. } => "unprocessable",
            GiftError::NotFoundOrExpired => "not-found",
            GiftError::Persistence { .. }
            | GiftError::PartialCreation { .. }
            | GiftError::Photo(_) => "general-error",
        }
    }

    /// Feathers-ish JSON payload.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "name": self.name(),
            "message": self.to_string(),
            "code": self.status_code(),
            "className": self.class_name(),
        })
    }
}
