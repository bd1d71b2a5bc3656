use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::{ConflictReport, EventAction, EventStatus};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Cannot {action} an event that is {status}")]
    InvalidStateTransition {
        action: EventAction,
        status: EventStatus,
    },

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Already checked in: {0}")]
    DuplicateAttendee(String),

    #[error("Scheduling conflict: {}", .0.reason.as_deref().unwrap_or("conflict"))]
    ScheduleConflict(Box<ConflictReport>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scanner error: {0}")]
    Scanner(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Conflict reports carry the offending event so the admin UI can show it.
        if let AppError::ScheduleConflict(report) = self {
            let body = Json(json!({
                "error": report.reason.clone().unwrap_or_default(),
                "conflicting_event": report.conflicting_event,
                "reason": report.reason,
            }));
            return (StatusCode::CONFLICT, body).into_response();
        }

        let message = self.to_string();
        let (status, error_message) = match self {
            AppError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error occurred".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidTimeFormat(_) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidStateTransition { .. } => (StatusCode::CONFLICT, message),
            AppError::CameraUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::DuplicateAttendee(msg) => (StatusCode::OK, msg),
            AppError::ScheduleConflict(_) => (StatusCode::CONFLICT, message),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Scanner(ref msg) => {
                tracing::error!("Scanner error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
