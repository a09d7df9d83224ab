use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy surfaced by the API.
///
/// `NotFound` deliberately covers both "no such task" and "task owned by
/// someone else", so callers cannot probe for foreign task ids. Store and
/// internal failures carry the underlying error for logging but reply with
/// an opaque message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Not logged in.")]
    Unauthenticated,
    #[error("Email already used.")]
    EmailTaken,
    #[error("Not found.")]
    NotFound,
    #[error("store error")]
    Store(#[from] sqlx::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Store(e) => {
                error!(error = %e, "store error");
                "Something went wrong.".to_string()
            }
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "Something went wrong.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
