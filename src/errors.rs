use axum::{http::StatusCode, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("layout path escapes views root")]
    PathEscape,
    #[error("layout filesystem error")]
    FilesystemError,
    #[error("not found")]
    NotFound,
    #[error("template error: {0}")]
    Template(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub code: &'a str,
    pub message: &'a str,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::PathEscape => "PathEscape",
            AppError::FilesystemError => "FilesystemError",
            AppError::NotFound => "NotFound",
            AppError::Template(_) => "Template",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PathEscape | AppError::FilesystemError | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. Fixed per kind so that neither the request
    /// input nor any filesystem location ends up in a response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::PathEscape => "Blocked malicious layout path",
            AppError::FilesystemError => "Layout unavailable",
            AppError::NotFound => "Not found",
            AppError::Template(_) => "Template rendering failed",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

pub fn into_response(err: AppError) -> (StatusCode, Json<ErrorBody<'static>>) {
    (
        err.status(),
        Json(ErrorBody {
            code: err.code(),
            message: err.public_message(),
        }),
    )
}
