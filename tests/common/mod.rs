#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_file_transfer::config::TransferConfig;
use rust_file_transfer::{AppState, create_app};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "------------------------7b3cc1a9d0e4f5a2";

pub struct TestApp {
    pub app: Router,
    pub config: TransferConfig,
    _root: TempDir,
}

pub fn setup() -> TestApp {
    setup_with(|_| {})
}

pub fn setup_with(customize: impl FnOnce(&mut TransferConfig)) -> TestApp {
    let root = TempDir::new().unwrap();
    let mut config = TransferConfig::rooted_at(root.path());
    customize(&mut config);

    TestApp {
        app: create_app(AppState::new(config.clone())),
        config,
        _root: root,
    }
}

pub struct Part<'a> {
    pub field: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(field: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            field,
            filename,
            content_type: "application/octet-stream",
            data,
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: {}\r\n\r\n",
                part.field, part.filename, part.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, body: Vec<u8>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn request(app: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

pub fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|e| panic!("not JSON ({}): {:?}", e, String::from_utf8_lossy(body)))
}

/// Files directly inside `dir`, sorted; empty if the directory does not exist.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.is_file())
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}

pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// PNG signature followed by filler, `len` bytes in total
pub fn png(len: usize) -> Vec<u8> {
    payload(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], len)
}

pub fn jpeg(len: usize) -> Vec<u8> {
    payload(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'], len)
}

pub fn gif(len: usize) -> Vec<u8> {
    payload(b"GIF89a", len)
}

pub fn pdf(len: usize) -> Vec<u8> {
    payload(b"%PDF-1.7\n", len)
}

fn payload(signature: &[u8], len: usize) -> Vec<u8> {
    let mut data = signature.to_vec();
    let mut i = 0u32;
    while data.len() < len {
        // Filler that never spells out the multipart boundary
        data.push(b'a' + (i % 26) as u8);
        i = i.wrapping_add(1);
    }
    data.truncate(len.max(signature.len()));
    data
}
