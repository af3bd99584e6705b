use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::ValidationResult;
use crate::services::api::ApiError;
use crate::services::payments::StatusChangeError;
use crate::services::reconciler::ReconcileError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error("validation failed")]
    Validation(ValidationResult),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Conflict(#[from] ReconcileError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl From<StatusChangeError> for AppError {
    fn from(e: StatusChangeError) -> Self {
        match e {
            StatusChangeError::Conflict(e) => AppError::Conflict(e),
            StatusChangeError::Api(e) => AppError::Api(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Api(ApiError::Rejected { status, .. }) if *status < 500 => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Api(_) => StatusCode::BAD_GATEWAY,
            AppError::Conflict(ReconcileError::UnknownBooking(_)) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        if let AppError::Store(e) = &self {
            tracing::error!(error = %e, "request failed on local store");
        }

        let body = match self {
            AppError::Validation(result) => serde_json::json!({
                "error": "validation failed",
                "valid": result.valid,
                "field_errors": result.field_errors,
            }),
            other => serde_json::json!({ "error": other.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
