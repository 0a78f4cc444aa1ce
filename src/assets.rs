use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tokio::fs;

const INDEX_FILE: &str = "index.html";
const PUBLIC_PREFIX: &str = "/public/";
pub const CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found")]
    NotFound,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("ico") => "image/x-icon",
        _ => "text/plain",
    }
}

/// Maps a request path onto the document root. `/` becomes the index page
/// and a leading `/public/` is dropped. Paths that could leave the root
/// resolve to nothing.
pub fn resolve(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = if request_path == "/" {
        INDEX_FILE
    } else {
        request_path
            .strip_prefix(PUBLIC_PREFIX)
            .unwrap_or(request_path)
            .trim_start_matches('/')
    };

    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if resolved == root {
        None
    } else {
        Some(resolved)
    }
}

#[derive(Debug)]
pub struct Asset {
    pub content_type: &'static str,
    pub contents: Vec<u8>,
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.content_type),
                (header::CACHE_CONTROL, CACHE_CONTROL),
            ],
            self.contents,
        )
            .into_response()
    }
}

pub async fn load(root: &Path, request_path: &str) -> Result<Asset, AssetError> {
    let path = resolve(root, request_path).ok_or(AssetError::NotFound)?;

    match fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Err(AssetError::NotFound),
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(AssetError::NotFound),
        Err(err) => return Err(err.into()),
    }

    let contents = fs::read(&path).await?;
    Ok(Asset {
        content_type: content_type_for(&path),
        contents,
    })
}
