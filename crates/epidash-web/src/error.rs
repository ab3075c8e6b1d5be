//! API error type with JSON bodies and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use epidash_analytics::AnalyticsError;
use epidash_common::EpidashError;
use epidash_db::DbError;
use epidash_llm::LlmError;
use serde::Serialize;

/// Body of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_types: Option<&'static [&'static str]>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{error}: {message}")]
    BadRequest { error: &'static str, message: String },
    #[error("Invalid type parameter")]
    InvalidType { valid: &'static [&'static str] },
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Invalid JSON response from AI: {0}")]
    InvalidModelJson(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest { error, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            ApiError::BadRequest { error, message } => {
                (StatusCode::BAD_REQUEST, *error, message.clone())
            }
            ApiError::InvalidType { valid } => (
                StatusCode::BAD_REQUEST,
                "Invalid type parameter",
                format!("type must be one of: {}", valid.join(", ")),
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed",
                "This endpoint does not accept that method".to_string(),
            ),
            ApiError::InvalidModelJson(detail) => {
                tracing::warn!(detail = %detail, "model returned invalid JSON");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Invalid JSON response from AI",
                    "The AI failed to generate valid JSON format".to_string(),
                )
            }
            ApiError::Upstream(detail) => {
                tracing::error!(detail = %detail, "language model request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Upstream error",
                    "The language model request failed".to_string(),
                )
            }
            ApiError::Unavailable(detail) => {
                tracing::error!(detail = %detail, "data store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Failed to fetch data",
                    "The data store is unavailable".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch data",
                    "An error occurred while processing your request".to_string(),
                )
            }
        };

        let valid_types = match &self {
            ApiError::InvalidType { valid } => Some(*valid),
            _ => None,
        };

        let body = ErrorBody { success: false, error, message, valid_types };
        (status, Json(body)).into_response()
    }
}

impl From<EpidashError> for ApiError {
    fn from(err: EpidashError) -> Self {
        match err {
            EpidashError::InvalidInput(m) => ApiError::bad_request("Bad request", m),
            EpidashError::Unavailable(m) => ApiError::Unavailable(m),
            EpidashError::Upstream(m) => ApiError::Upstream(m),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        EpidashError::from(err).into()
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        EpidashError::from(err).into()
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::InvalidJson(detail) => ApiError::InvalidModelJson(detail),
            other => EpidashError::from(other).into(),
        }
    }
}
