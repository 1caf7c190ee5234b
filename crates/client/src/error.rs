//! Error types for the client crate.

use balances_core::entities::EntityRef;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure codes the backend reports in `{error: {code, ...}}` bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FailureCode {
    BadRequest,
    Unauthorized,
    InternalError,
    Unimplemented,
    EntityNotFound,
    OperationNotPermitted,
    #[serde(other)]
    Unknown,
}

impl FailureCode {
    /// Code to assume when the backend only sent a plain message.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => FailureCode::BadRequest,
            401 => FailureCode::Unauthorized,
            403 => FailureCode::OperationNotPermitted,
            404 => FailureCode::EntityNotFound,
            501 => FailureCode::Unimplemented,
            500..=599 => FailureCode::InternalError,
            _ => FailureCode::Unknown,
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Structured failure decoded from an error response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiFailure {
    pub code: FailureCode,
    pub message: String,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
}

impl ApiFailure {
    pub fn from_message(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: FailureCode::from_status(status),
            message: message.into(),
            entity: None,
            operation: None,
        }
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.operation, &self.entity) {
            (Some(operation), Some(entity)) => {
                write!(f, "[{}] {} on {}: {}", self.code, operation, entity, self.message)
            }
            (Some(scope), None) | (None, Some(scope)) => {
                write!(f, "[{}] {}: {}", self.code, scope, self.message)
            }
            (None, None) => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

/// Errors that can occur while talking to the backend or converging state.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the backend
    #[error("API error ({status}): {failure}")]
    Api { status: u16, failure: ApiFailure },

    /// Missing, expired or rejected credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Invalid request (malformed header values, etc.)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A successful response without the expected payload
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Core(#[from] balances_core::Error),

    /// A fetch needed to complete an aggregate failed
    #[error("Failed to load {entity}: {source}")]
    DependencyFailed {
        entity: EntityRef,
        source: Box<ClientError>,
    },

    /// Readiness stopped making progress
    #[error("Could not resolve {}", format_refs(.0))]
    Unresolvable(Vec<EntityRef>),

    #[error("{entity} was not ready within {timeout:?}")]
    ReadinessTimeout { entity: EntityRef, timeout: Duration },
}

fn format_refs(refs: &[EntityRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ClientError {
    pub fn api(status: u16, failure: ApiFailure) -> Self {
        Self::Api { status, failure }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Whether the session should be dropped because of this error.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            ClientError::Unauthorized(_) => true,
            ClientError::Api { status, failure } => {
                *status == 401 || failure.code == FailureCode::Unauthorized
            }
            ClientError::DependencyFailed { source, .. } => source.is_unauthorized(),
            _ => false,
        }
    }

    /// Whether the backend reported the record as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ClientError::Api { failure, .. } if failure.code == FailureCode::EntityNotFound
        )
    }
}
