use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use prism_core::error::PrismError;

/// Boundary error: every failure leaves the handler as a
/// `{"status":"error","reason":…}` body with a matching HTTP status.
pub struct ApiError {
    status: StatusCode,
    reason: String,
}

impl ApiError {
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            reason: reason.into(),
        }
    }
}

impl From<PrismError> for ApiError {
    fn from(e: PrismError) -> Self {
        let status = match &e {
            PrismError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PrismError::ChunkChecksum { .. } | PrismError::FinalChecksum => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PrismError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            reason: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": "error",
            "reason": self.reason,
        });
        (self.status, Json(body)).into_response()
    }
}
