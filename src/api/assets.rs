//! Embedded static assets for the chat page
//!
//! In development, falls back to serving from the filesystem.

use super::handlers::AppError;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
};
use rust_embed::Embed;
use std::path::{Component, Path, PathBuf};

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

const UI_DIR: &str = "ui";

/// Serve embedded static files, with filesystem fallback for development
pub async fn serve_static(req: Request<Body>) -> Result<Response<Body>, AppError> {
    let path = req
        .uri()
        .path()
        .trim_start_matches('/')
        .trim_start_matches("assets/")
        .to_string();

    if !is_plain_relative(&path) {
        tracing::debug!(path = %path, "Rejected asset path");
        return Err(AppError::NotFound(format!("{path} not found")));
    }

    let content = match Assets::get(&path) {
        Some(file) => file.data.into_owned(),
        None => std::fs::read(PathBuf::from(UI_DIR).join(&path))
            .map_err(|_| AppError::NotFound(format!("{path} not found")))?,
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Only plain names may reach the UI directory; a root, prefix or `..` would escape it
fn is_plain_relative(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

/// Get the index.html content (embedded or from filesystem)
pub fn get_index_html() -> Option<String> {
    if let Some(content) = Assets::get("index.html") {
        return String::from_utf8(content.data.into_owned()).ok();
    }
    std::fs::read_to_string(PathBuf::from(UI_DIR).join("index.html")).ok()
}
