//! Resource-level error types.

use thiserror::Error;
use tracing::error;

use crate::{IntoResponse, Response, Status};

/// Errors a resource operation reports to its caller.
///
/// Each variant maps to one HTTP status; the body is always
/// `{"error": <message>, "status": <code>}`.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A required field is missing or a value is out of range.
    #[error("{0}")]
    Validation(String),

    /// No record has the requested id. Carries the singular resource name.
    #[error("{0} not found")]
    NotFound(String),

    /// A payload arrived without a JSON content type.
    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    /// Something that should not happen. The detail is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResourceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::UnsupportedMediaType => Status::UnsupportedMediaType,
            Self::Internal(_) => Status::InternalServerError,
        }
    }
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        match self {
            Self::Internal(detail) => {
                error!(%detail, "internal error");
                Response::error(Status::InternalServerError, "Internal server error")
            }
            other => Response::error(other.status(), other.to_string()),
        }
    }
}
