pub mod download;
pub mod health;
pub mod upload;

use crate::api::error::AppError;
use axum::http::Uri;

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}
