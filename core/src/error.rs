//! Error types for the todo/social client core.
//!
//! # Design
//! Two families: validation failures, detected locally before any request is
//! built, and everything that went wrong on or across the network. `NotFound`
//! keeps its own variant because hosts distinguish "that todo is gone" from
//! other server failures. Hosts that only show a single message use
//! `ApiError::user_message`.

use thiserror::Error;

use crate::session::StoreError;

/// Message shown when the server gave no usable explanation.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required input was missing or blank. No request was issued.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An authenticated call was attempted with no stored session.
    #[error("not logged in")]
    NotAuthenticated,

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error(transparent)]
    Transport(#[from] crate::http::TransportError),

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    #[error("session store: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }

    /// Collapse the error into the one line a user gets to see.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::HttpError {
                message: Some(msg), ..
            } if !msg.is_empty() => msg.clone(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}
