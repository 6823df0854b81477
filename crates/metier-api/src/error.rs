//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use metier_core::logging;

/// Error returned by handlers.
///
/// Every variant renders as `{"error": <message>, "code": <stable code>}`.
/// Internal failures never expose their details to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Internal(metier_core::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "validation_error",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<metier_core::Error> for ApiError {
    fn from(err: metier_core::Error) -> Self {
        match err {
            metier_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            metier_core::Error::OccupationNotFound(id) => {
                ApiError::NotFound(format!("Occupation '{}' not found", id))
            }
            metier_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            metier_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            ApiError::Internal(err) => {
                error!(subsystem = logging::SUBSYSTEM_API, error = %err, "Request failed");
                "Internal server error".to_string()
            }
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => {
                msg
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
