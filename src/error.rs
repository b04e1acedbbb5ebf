use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::validation::FieldErrors;

pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const FETCH_FAILED: &str = "Failed to fetch data. Please try again.";
pub const LOGIN_ERROR: &str = "Invalid username or phone number.";
pub const CREATE_FAILED: &str = "Failed to create todo";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{0} endpoint not found")]
    NotFound(&'static str),

    #[error("server error ({0})")]
    Server(reqwest::StatusCode),

    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("{}", NETWORK_ERROR)]
    Network(#[source] ClientError),

    #[error("{}", LOGIN_ERROR)]
    InvalidCredentials,
}

#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("{}", FETCH_FAILED)]
    Fetch(#[source] ClientError),

    #[error("{}", CREATE_FAILED)]
    Create(#[source] ClientError),
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid input")]
    Validation(FieldErrors),

    #[error("not signed in")]
    Unauthorized,

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Todo(#[from] TodoError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            AppError::Login(err) => {
                let status = match &err {
                    LoginError::Network(_) => StatusCode::BAD_GATEWAY,
                    LoginError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                };
                (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
            }
            AppError::Todo(err) => (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
