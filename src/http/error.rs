use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

pub const MISSING_BOOKING_PARAMS: &str =
    "Missing required parameters: venueId, startDate, and endDate are required";
pub const MISSING_DATE_PARAMS: &str =
    "Missing required parameters: startDate and endDate are required";
pub const INVALID_VENUE_ID: &str = "Invalid venue ID format";
pub const INVALID_BOOKING_ID: &str = "Invalid booking ID format";

/// API error response body: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Engine(EngineError),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Engine(e) => match e {
                EngineError::Validation(_)
                | EngineError::Rejected(_)
                | EngineError::LimitExceeded(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                EngineError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                // Already logged where detected; callers get no internals.
                EngineError::ConsistencyFault { .. } => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Booking records are inconsistent; the change was not applied".to_string(),
                ),
                EngineError::WalError(ref detail) => {
                    tracing::error!("storage failure: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Storage failure".to_string(),
                    )
                }
            },
        };

        (status, Json(ApiError { error: message })).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<crate::rules::DateParseError> for AppError {
    fn from(err: crate::rules::DateParseError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<crate::model::ReversedRange> for AppError {
    fn from(err: crate::model::ReversedRange) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}
