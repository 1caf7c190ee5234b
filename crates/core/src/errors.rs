//! Core error types for the Balances client.
//!
//! Transport errors live in the client crate; everything here is about data
//! that has already reached the process (payload shape, reducer wiring,
//! session persistence, user input).

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A payload did not have the shape its schema declares.
    #[error("Failed to decode payload: {0}")]
    Decode(String),

    /// A reducer was constructed with an invalid set of action types.
    #[error("Invalid reducer configuration: {0}")]
    InvalidReducer(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn invalid_reducer(message: impl Into<String>) -> Self {
        Self::InvalidReducer(message.into())
    }
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}
