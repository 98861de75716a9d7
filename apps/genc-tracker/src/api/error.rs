//! # API Errors
//!
//! Maps core errors onto HTTP status codes. Every error body has the shape
//! `{ "detail": "..." }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use genc_core::GencError;
use serde::{Deserialize, Serialize};

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// A handler failure, ready to be rendered.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<GencError> for ApiError {
    fn from(err: GencError) -> Self {
        let status = match &err {
            GencError::InvalidTransition { .. }
            | GencError::InvalidField { .. }
            | GencError::AlreadyExists { .. } => StatusCode::BAD_REQUEST,
            GencError::NotFound { .. } => StatusCode::NOT_FOUND,
            GencError::InUse { .. } => StatusCode::CONFLICT,
            GencError::SerializationError(_)
            | GencError::DeserializationError(_)
            | GencError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "Storage failure");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use genc_core::Status;

    #[test]
    fn transition_is_bad_request() {
        let err = ApiError::from(GencError::InvalidTransition {
            current: Status::Idle,
            requested: Status::BillingStarted,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.detail,
            "Invalid status transition from Idle to Billing Started"
        );
    }

    #[test]
    fn not_found_and_in_use() {
        assert_eq!(
            ApiError::from(GencError::not_found("GenC", 3)).status(),
            StatusCode::NOT_FOUND
        );
        let in_use = GencError::InUse {
            entity: "Mentor",
            key: "1".to_string(),
            referrers: "2 GenC(s)".to_string(),
        };
        assert_eq!(ApiError::from(in_use).status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_is_server_error() {
        assert_eq!(
            ApiError::from(GencError::IoError("disk".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
