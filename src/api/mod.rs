pub mod attendance;
pub mod reports;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::engine::AttendanceError;

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::DuplicateSession { .. } => StatusCode::CONFLICT,
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::AlreadyClosed(_) => StatusCode::CONFLICT,
            AttendanceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Storage details go to the log, not to the client.
            AttendanceError::Storage(e) => {
                tracing::error!(error = %e, "request failed on storage");
                HttpResponse::InternalServerError().json(json!({
                    "message": "Internal Server Error"
                }))
            }
            AttendanceError::DuplicateSession { existing_id } => {
                HttpResponse::Conflict().json(json!({
                    "message": self.to_string(),
                    "record_id": existing_id,
                }))
            }
            other => HttpResponse::build(other.status_code()).json(json!({
                "message": other.to_string()
            })),
        }
    }
}
