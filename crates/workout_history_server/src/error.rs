use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use workout_history::WorkoutError;

/// HTTP-facing wrapper around library failures.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Accepted field names, only set when a request named an unknown field.
    pub allowed: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_fields: Option<&'a [String]>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            allowed: None,
        }
    }
}

pub fn status_for(err: &WorkoutError) -> StatusCode {
    match err {
        WorkoutError::NoWorkoutData
        | WorkoutError::MalformedInput { .. }
        | WorkoutError::MissingColumns(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WorkoutError::InvalidField { .. } | WorkoutError::InvalidDate(_) => {
            StatusCode::BAD_REQUEST
        }
        WorkoutError::Io(_) | WorkoutError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<WorkoutError> for ApiError {
    fn from(err: WorkoutError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        }
        let allowed = match &err {
            WorkoutError::InvalidField { allowed, .. } => Some(allowed.clone()),
            _ => None,
        };
        Self {
            status,
            message: err.to_string(),
            allowed,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            allowed_fields: self.allowed.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}
