use crate::AppState;
use crate::api::error::AppError;
use crate::services::storage::StorageError;
use crate::utils::validation::is_valid_requested_name;
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct DownloadResponse {
    pub message: String,
    pub file: String,
    pub size: u64,
}

#[utoipa::path(
    get,
    path = "/files/{name}",
    params(
        ("name" = String, Path, description = "Name of a file in the download source directory")
    ),
    responses(
        (status = 200, description = "File copied into the download directory", body = DownloadResponse),
        (status = 400, description = "Name is not a plain file name", body = ErrorResponse),
        (status = 404, description = "File not available", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 500, description = "Destination could not be written", body = ErrorResponse)
    ),
    tag = "download"
)]
pub async fn download_file(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<DownloadResponse>, AppError> {
    copy_requested_file(&state, name).await
}

/// Catch-all variant of [`download_file`] mounted at the root.
#[utoipa::path(
    get,
    path = "/{name}",
    params(
        ("name" = String, Path, description = "Name of a file in the download source directory")
    ),
    responses(
        (status = 200, description = "File copied into the download directory", body = DownloadResponse),
        (status = 400, description = "Name is not a plain file name", body = ErrorResponse),
        (status = 404, description = "File not available", body = ErrorResponse)
    ),
    tag = "download"
)]
pub async fn download_root(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<DownloadResponse>, AppError> {
    copy_requested_file(&state, name).await
}

async fn copy_requested_file(
    state: &AppState,
    name: Result<Path<String>, PathRejection>,
) -> Result<Json<DownloadResponse>, AppError> {
    let Path(name) = name.map_err(|e| AppError::PathNotAvailable(e.body_text()))?;
    if !is_valid_requested_name(&name) {
        return Err(AppError::PathNotAvailable(name));
    }

    let source = state.config.download_source_dir.join(&name);
    let destination = state.config.download_dest_dir.join(&name);

    let size = state
        .storage
        .copy_file(&source, &destination)
        .await
        .map_err(|err| match err {
            StorageError::SourceUnavailable { source: cause, .. } => {
                debug!("Source {} unavailable: {}", source.display(), cause);
                AppError::FileNotAvailable(name.clone())
            }
            other => other.into(),
        })?;

    info!(
        "📥 Downloaded {} into {} ({} bytes)",
        name,
        destination.display(),
        size
    );

    Ok(Json(DownloadResponse {
        message: "Downloaded Successfully".to_string(),
        file: name,
        size,
    }))
}
