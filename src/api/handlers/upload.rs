use crate::AppState;
use crate::api::error::AppError;
use crate::utils::naming::NamingScheme;
use crate::utils::validation::{
    allowed_content_type, exceeds_limit, extension_for, original_extension,
};
use axum::{
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

/// Form field carrying the single-file upload
pub const UPLOAD_FIELD: &str = "uploadFile";

/// Form field carrying the files of a multi-file upload
pub const MULTI_UPLOAD_FIELD: &str = "file";

const UPLOAD_FORM: &str = include_str!("../../../templates/upload.html");

#[derive(Deserialize, ToSchema)]
pub struct UploadForm {
    #[serde(rename = "uploadFile")]
    #[schema(value_type = String, format = Binary)]
    pub upload_file: Vec<u8>,
}

#[derive(Deserialize, ToSchema)]
pub struct MultiUploadForm {
    #[schema(value_type = Vec<String>)]
    pub file: Vec<Vec<u8>>,
}

#[utoipa::path(
    get,
    path = "/upload",
    responses(
        (status = 200, description = "Upload form", content_type = "text/html", body = String)
    ),
    tag = "upload"
)]
pub async fn upload_form() -> Html<&'static str> {
    Html(UPLOAD_FORM)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored under a random name", content_type = "text/plain", body = String),
        (status = 400, description = "Malformed form or missing file", body = ErrorResponse),
        (status = 413, description = "File too big", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse),
        (status = 500, description = "File could not be stored", body = ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::CantParseForm(e.body_text()))?;
    let config = &state.config;

    let field = loop {
        let next = multipart
            .next_field()
            .await
            .map_err(|e| form_error(e, config.max_total_multipart_bytes))?;
        match next {
            Some(field) if field.name() == Some(UPLOAD_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(AppError::InvalidFile(format!(
                    "no '{}' field in form",
                    UPLOAD_FIELD
                )));
            }
        }
    };

    let original_name = field.file_name().unwrap_or("unnamed").to_string();
    let data = read_limited(
        field,
        &original_name,
        config.max_single_upload_bytes,
        config.max_total_multipart_bytes,
    )
    .await?;
    info!("📦 Received {} ({} bytes)", original_name, data.len());

    let detected = allowed_content_type(&data).map_err(rejected_type)?;
    let extension =
        extension_for(detected).ok_or_else(|| AppError::CantReadFileType(detected.to_string()))?;

    let stored = state
        .storage
        .store_new(
            &config.upload_dir,
            &NamingScheme::random_token(extension),
            &data,
        )
        .await?;

    info!(
        "✅ Stored {} as {} ({}, {} bytes)",
        original_name,
        stored.path.display(),
        detected,
        stored.size
    );

    Ok(plain_text("SUCCESS"))
}

#[utoipa::path(
    post,
    path = "/upload-multipleFile",
    request_body(content = MultiUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "All files stored", content_type = "text/plain", body = String),
        (status = 400, description = "Malformed form or no files", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 413, description = "A file is too big", body = ErrorResponse),
        (status = 415, description = "A file has a disallowed content type", body = ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn upload_multiple_files(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::CantParseForm(e.body_text()))?;
    let config = &state.config;
    let mut stored_count = 0usize;

    // Files are stored as they arrive; an error stops the batch but keeps
    // whatever was already written.
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error(e, config.max_total_multipart_bytes))?
    {
        if field.name() != Some(MULTI_UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("unnamed").to_string();
        let data = read_limited(
            field,
            &original_name,
            config.max_per_file_multipart_bytes,
            config.max_total_multipart_bytes,
        )
        .await?;

        let detected = allowed_content_type(&data).map_err(rejected_type)?;
        let extension = match original_extension(&original_name) {
            Some(ext) => ext,
            None => extension_for(detected)
                .ok_or_else(|| AppError::CantReadFileType(detected.to_string()))?
                .to_string(),
        };

        let stored = state
            .storage
            .store_new(&config.uploads_dir, &NamingScheme::timestamp(extension), &data)
            .await?;

        info!(
            "✅ Stored {} as {} ({} bytes)",
            original_name,
            stored.path.display(),
            stored.size
        );
        stored_count += 1;
    }

    if stored_count == 0 {
        return Err(AppError::InvalidFile(format!(
            "no '{}' field in form",
            MULTI_UPLOAD_FIELD
        )));
    }

    info!("📦 Multi-file upload finished, {} file(s)", stored_count);
    Ok(plain_text("Upload successful"))
}

/// Buffers a field, failing as soon as it grows past `limit`.
async fn read_limited(
    mut field: Field<'_>,
    name: &str,
    limit: usize,
    body_limit: usize,
) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            too_big("request body", body_limit)
        } else {
            AppError::InvalidFile(e.body_text())
        }
    })? {
        if exceeds_limit(data.len() + chunk.len(), limit) {
            return Err(too_big(name, limit));
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

fn form_error(err: MultipartError, body_limit: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_big("request body", body_limit)
    } else {
        AppError::CantParseForm(err.body_text())
    }
}

fn too_big(name: &str, limit: usize) -> AppError {
    AppError::FileTooBig {
        name: name.to_string(),
        limit,
    }
}

fn rejected_type(detected: Option<&'static str>) -> AppError {
    AppError::InvalidFileType(detected.unwrap_or("unknown").to_string())
}

fn plain_text(body: &'static str) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())], body)
}
