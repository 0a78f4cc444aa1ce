use std::path::Path;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::AppError;
use crate::storage::FileStorage;

pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Extension and MIME type pairs accepted for uploads.
const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("pdf", "application/pdf"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Photo,
    Resume,
}

impl UploadKind {
    pub fn field_name(self) -> &'static str {
        match self {
            UploadKind::Photo => "photo",
            UploadKind::Resume => "resume",
        }
    }

    fn failure_context(self) -> &'static str {
        match self {
            UploadKind::Photo => "Error uploading photo",
            UploadKind::Resume => "Error uploading resume",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub original_name: String,
    pub content_type: String,
    pub size: usize,
}

impl StoredFile {
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.name)
    }
}

/// Returns the original extension (case preserved) when both it and the
/// declared content type belong to the same allow-list entry.
pub fn check_file_type<'a>(original_name: &'a str, content_type: &str) -> Result<&'a str, AppError> {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(AppError::UnsupportedFileType)?;

    let extension_lower = extension.to_ascii_lowercase();
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let allowed = ALLOWED_TYPES
        .iter()
        .any(|(ext, allowed_mime)| *ext == extension_lower && *allowed_mime == mime);
    if allowed {
        Ok(extension)
    } else {
        Err(AppError::UnsupportedFileType)
    }
}

/// Unique storage name; only the extension of the original survives.
pub fn generate_name(extension: &str) -> String {
    format!("{}.{}", Uuid::new_v4(), extension)
}

/// Reads the `kind` field from the request, validates it and writes it to
/// `storage`. The profile record is left for the caller to update.
pub async fn receive(
    multipart: Result<Multipart, MultipartRejection>,
    kind: UploadKind,
    storage: &dyn FileStorage,
) -> Result<StoredFile, AppError> {
    let mut multipart = multipart.map_err(|_| AppError::MissingFile)?;
    let context = kind.failure_context();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(context, err))?
    {
        if field.name() != Some(kind.field_name()) {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let extension = check_file_type(&original_name, &content_type)?;

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| multipart_error(context, err))?
        {
            if data.len() + chunk.len() > MAX_FILE_SIZE {
                return Err(AppError::PayloadTooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        let name = generate_name(extension);
        storage
            .save(&name, &data)
            .await
            .map_err(|err| AppError::internal(context, err))?;

        let stored = StoredFile {
            name,
            original_name,
            content_type,
            size: data.len(),
        };
        tracing::info!(
            file = %stored.name,
            original = %stored.original_name,
            content_type = %stored.content_type,
            size = stored.size,
            "stored upload"
        );
        return Ok(stored);
    }

    Err(AppError::MissingFile)
}

fn multipart_error(context: &'static str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::internal(context, err)
    }
}
