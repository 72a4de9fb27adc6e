//! HTTP Error Types
//!
//! Maps application errors to status codes and JSON error bodies.

use crate::types::ErrorBody;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pdf2html_core::domain::DomainError;
use pdf2html_core::error::AppError;
use thiserror::Error;
use tracing::{info, warn};

/// Error returned by every handler
#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] AppError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(AppError::Domain(err))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError(AppError::Validation(format!("Malformed upload: {}", err)))
    }
}

/// HTTP status for an application error
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Domain(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        AppError::ConversionFailed { .. }
        | AppError::OutputMissing
        | AppError::Io(_)
        | AppError::Config(_)
        | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON body for an application error
pub fn body_for(err: AppError) -> ErrorBody {
    match err {
        AppError::Timeout(_) => ErrorBody::new("Conversion timeout"),
        AppError::ConversionFailed { details } => {
            ErrorBody::with_details("Conversion failed", details)
        }
        other => ErrorBody::new(other.to_string()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);

        if self.0.is_client_error() {
            info!(status = status.as_u16(), error = %self.0, "Request rejected");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request failed");
        }

        (status, Json(body_for(self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AppError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::Domain(DomainError::ValidationError("x".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AppError::Timeout(Duration::from_secs(300))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&AppError::OutputMissing),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&AppError::ConversionFailed {
                details: "x".into()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_bodies() {
        let body = serde_json::to_value(body_for(AppError::ConversionFailed {
            details: "Error: bad xref".into(),
        }))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"error": "Conversion failed", "details": "Error: bad xref"})
        );

        let body = serde_json::to_value(body_for(AppError::Domain(
            DomainError::ValidationError("File must be a PDF".into()),
        )))
        .unwrap();
        assert_eq!(body, serde_json::json!({"error": "File must be a PDF"}));

        let body = serde_json::to_value(body_for(AppError::OutputMissing)).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Output file not generated"}));
    }
}
