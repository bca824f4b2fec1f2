//! Error-to-HTTP response conversion.
//!
//! Wraps [`ps_core::Error`] so route handlers can end with `?` and still
//! produce the JSON envelope API clients expect. Error envelopes mirror the
//! success envelopes elsewhere in the API: every body carries a `success`
//! flag, so clients can branch on one field regardless of outcome.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError(ps_core::Error);

impl From<ps_core::Error> for AppError {
    fn from(e: ps_core::Error) -> Self {
        Self(e)
    }
}

impl AppError {
    /// Stable machine-readable code for the wrapped error kind.
    fn code(&self) -> &'static str {
        match &self.0 {
            ps_core::Error::NotFound { .. } => "not_found",
            ps_core::Error::Unauthorized(_) => "unauthorized",
            ps_core::Error::Forbidden(_) => "forbidden",
            ps_core::Error::Validation(_) => "validation_error",
            ps_core::Error::Conflict(_) => "conflict",
            ps_core::Error::Database { .. } => "database_error",
            ps_core::Error::Io { .. } => "io_error",
            ps_core::Error::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.0, "Request failed");
        }

        let body = json!({
            "success": false,
            "error": self.0.to_string(),
            "code": self.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
