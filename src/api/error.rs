use crate::services::storage::StorageError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not parse multipart form: {0}")]
    CantParseForm(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("{name} exceeds the limit of {limit} bytes")]
    FileTooBig { name: String, limit: usize },

    #[error("File type {0} is not allowed")]
    InvalidFileType(String),

    #[error("No file extension registered for {0}")]
    CantReadFileType(String),

    #[error("Could not create directory: {0}")]
    CantCreateDir(String),

    #[error("Could not write file: {0}")]
    CantWriteFile(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Path not available: {0}")]
    PathNotAvailable(String),

    #[error("File not available: {0}")]
    FileNotAvailable(String),

    #[error("Unable to create file: {0}")]
    UnableToCreateFile(String),

    #[error("No route for {0}")]
    RouteNotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Body of every error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::CantParseForm(_) => "CANT_PARSE_FORM",
            AppError::InvalidFile(_) => "INVALID_FILE",
            AppError::FileTooBig { .. } => "FILE_TOO_BIG",
            AppError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            AppError::CantReadFileType(_) => "CANT_READ_FILE_TYPE",
            AppError::CantCreateDir(_) => "CANT_CREATE_DIR",
            AppError::CantWriteFile(_) => "CANT_WRITE_FILE",
            AppError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AppError::PathNotAvailable(_) => "PATH_NOT_AVAILABLE",
            AppError::FileNotAvailable(_) => "FILE_NOT_AVAILABLE",
            AppError::UnableToCreateFile(_) => "UNABLE_TO_CREATE_FILE",
            AppError::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::CantParseForm(_)
            | AppError::InvalidFile(_)
            | AppError::PathNotAvailable(_) => StatusCode::BAD_REQUEST,
            AppError::FileTooBig { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::FileNotAvailable(_) | AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::CantReadFileType(_)
            | AppError::CantCreateDir(_)
            | AppError::CantWriteFile(_)
            | AppError::UnableToCreateFile(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        let detail = err.to_string();
        match err {
            StorageError::CreateDir { .. } => AppError::CantCreateDir(detail),
            StorageError::Write { .. } | StorageError::NamesExhausted(_) => {
                AppError::CantWriteFile(detail)
            }
            StorageError::SourceUnavailable { .. } => AppError::FileNotAvailable(detail),
            StorageError::CreateDestination { .. } | StorageError::Copy { .. } => {
                AppError::UnableToCreateFile(detail)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("{}: {}", self.code(), self);
            "Internal Server Error".to_string()
        } else {
            tracing::debug!("{}: {}", self.code(), self);
            self.to_string()
        };

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}
