//! HTTP handlers for all API routes.

pub mod data;
pub mod chat;
pub mod ask;
pub mod groups;

use crate::error::ApiError;

/// Fallback for routes hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
