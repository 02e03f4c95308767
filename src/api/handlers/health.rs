use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use std::path::Path;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub upload_dir: String,
    pub download_source: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        upload_dir: dir_status(&state.config.upload_dir).await.to_string(),
        download_source: dir_status(&state.config.download_source_dir)
            .await
            .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Upload directories are created lazily, so "missing" is not an error
async fn dir_status(dir: &Path) -> &'static str {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => "present",
        Ok(_) => "not a directory",
        Err(_) => "missing",
    }
}
