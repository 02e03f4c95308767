pub mod api;
pub mod config;
pub mod services;
pub mod utils;

use crate::api::handlers::{self, download, health, upload};
use crate::config::TransferConfig;
use crate::services::storage::{LocalStorageService, StorageService};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_form,
        api::handlers::upload::upload_file,
        api::handlers::upload::upload_multiple_files,
        api::handlers::download::download_file,
        api::handlers::download::download_root,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::error::ErrorResponse,
            api::handlers::upload::UploadForm,
            api::handlers::upload::MultiUploadForm,
            api::handlers::download::DownloadResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "upload", description = "File upload endpoints"),
        (name = "download", description = "File download endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub config: TransferConfig,
}

impl AppState {
    /// State backed by the local filesystem
    pub fn new(config: TransferConfig) -> Self {
        Self {
            storage: Arc::new(LocalStorageService::new()),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_total_multipart_bytes;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .route(
            "/upload",
            get(upload::upload_form)
                .post(upload::upload_file)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/upload-multipleFile",
            post(upload::upload_multiple_files).fallback(handlers::method_not_allowed),
        )
        // axum would answer HEAD with the GET handler, which copies the file
        .route(
            "/files/:name",
            get(download::download_file)
                .head(handlers::method_not_allowed)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/:name",
            get(download::download_root)
                .head(handlers::method_not_allowed)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::route_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
