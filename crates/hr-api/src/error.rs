//! API error handling
//!
//! Every failure is rendered as `{ "_type": "Error", "errorIdentifier", "message" }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hr_core::error::{HrError, ValidationErrors};
use serde::Serialize;
use std::collections::BTreeMap;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(ValidationErrors),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn identifier(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "hrdash:NotFound",
            ApiError::Validation(_) => "hrdash:PropertyConstraintViolation",
            ApiError::Unauthorized(_) => "hrdash:Unauthenticated",
            ApiError::Forbidden(_) => "hrdash:MissingPermission",
            ApiError::BadRequest(_) => "hrdash:InvalidRequestBody",
            ApiError::Conflict(_) => "hrdash:Conflict",
            ApiError::Internal(_) => "hrdash:InternalError",
        }
    }
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        match err {
            HrError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            HrError::Unauthorized { message } => ApiError::Unauthorized(message),
            HrError::Forbidden { message } => ApiError::Forbidden(message),
            HrError::Validation(errors) => ApiError::Validation(errors),
            HrError::Conflict { message } => ApiError::Conflict(message),
            HrError::Database(message)
            | HrError::Internal(message)
            | HrError::Configuration(message) => {
                tracing::error!(error = %message, "request failed");
                ApiError::Internal("An internal error occurred".to_string())
            }
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(rename = "_type")]
    type_name: &'static str,
    error_identifier: &'static str,
    message: String,
    /// Field errors of a validation failure
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let identifier = self.identifier();
        let (message, errors) = match self {
            ApiError::Validation(errors) => {
                let message = errors.full_messages().join(", ");
                (message, Some(errors.errors))
            }
            ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => (msg, None),
        };

        let body = ErrorBody {
            type_name: "Error",
            error_identifier: identifier,
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
