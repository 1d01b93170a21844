use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Question not found")]
    QuestionNotFound,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            PollError::QuestionNotFound => (StatusCode::NOT_FOUND, "Not found"),
            PollError::DatabaseError(msg) => {
                error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let details = match &self {
            PollError::DatabaseError(_) => "The request could not be completed".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "details": details
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for PollError {
    fn from(error: sqlx::Error) -> Self {
        PollError::DatabaseError(error.to_string())
    }
}
