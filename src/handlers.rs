use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_util::io::ReaderStream;

use crate::app::AppState;
use crate::assets::{self, AssetError};
use crate::error::AppError;
use crate::models::{ProfileRecord, ProfileStats, ProfileUpdate};
use crate::storage::StorageError;
use crate::upload::{self, UploadKind};

#[derive(Serialize)]
pub struct DataResponse<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
pub struct MessageResponse {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    success: bool,
    message: &'static str,
    data: ProfileRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    success: bool,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume_url: Option<String>,
    data: ProfileRecord,
}

#[derive(Serialize)]
pub struct HealthResponse {
    success: bool,
    message: &'static str,
    timestamp: DateTime<Utc>,
}

pub async fn get_profile(State(state): State<AppState>) -> Json<DataResponse<ProfileRecord>> {
    Json(DataResponse {
        success: true,
        data: state.profile.get().await,
    })
}

pub async fn update_profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<UpdateResponse>, AppError> {
    let Json(update) = payload.map_err(|rejection| AppError::Validation(vec![rejection.body_text()]))?;

    let data = state.profile.update(update).await?;
    tracing::info!(updated_at = %data.updated_at, "profile updated");

    Ok(Json(UpdateResponse {
        success: true,
        message: "Profile updated successfully",
        data,
    }))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let stored = upload::receive(multipart, UploadKind::Photo, &*state.storage).await?;
    let photo_url = stored.url();
    let data = state.profile.set_photo_url(photo_url.clone()).await;

    Ok(Json(UploadResponse {
        success: true,
        message: "Photo uploaded successfully",
        photo_url: Some(photo_url),
        resume_url: None,
        data,
    }))
}

pub async fn upload_resume(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let stored = upload::receive(multipart, UploadKind::Resume, &*state.storage).await?;
    let resume_url = stored.url();
    let data = state.profile.set_resume_url(resume_url.clone()).await;

    Ok(Json(UploadResponse {
        success: true,
        message: "Resume uploaded successfully",
        photo_url: None,
        resume_url: Some(resume_url),
        data,
    }))
}

/// Removes a stored file. Profile fields pointing at it are left as they are.
pub async fn delete_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    match state.storage.delete(&filename).await {
        Ok(()) => {
            tracing::info!(file = %filename, "deleted upload");
            Ok(Json(MessageResponse {
                success: true,
                message: "File deleted successfully",
            }))
        }
        Err(StorageError::NotFound(_) | StorageError::InvalidName(_)) => Err(AppError::NotFound),
        Err(err) => Err(AppError::internal("Error deleting file", err)),
    }
}

pub async fn profile_stats(State(state): State<AppState>) -> Json<DataResponse<ProfileStats>> {
    Json(DataResponse {
        success: true,
        data: state.profile.stats().await,
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running",
        timestamp: Utc::now(),
    })
}

pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let file = match state.storage.open(&filename).await {
        Ok(file) => file,
        Err(StorageError::NotFound(_) | StorageError::InvalidName(_)) => return Err(AppError::NotFound),
        Err(err) => return Err(AppError::internal("Error reading file", err)),
    };

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);
    let mime_type = mime_guess::from_path(&filename).first_or_octet_stream();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type.to_string()),
            (header::CACHE_CONTROL, "public, max-age=31536000".to_string()),
        ],
        body,
    )
        .into_response())
}

/// Site assets for anything the API doesn't route, then the 404 envelope.
pub async fn fallback(State(state): State<AppState>, method: Method, uri: Uri) -> Result<Response, AppError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AppError::RouteNotFound);
    }

    match assets::load(&state.public_dir, uri.path()).await {
        Ok(asset) => Ok(asset.into_response()),
        Err(AssetError::NotFound) => Err(AppError::RouteNotFound),
        Err(err) => Err(AppError::internal("Internal server error", err)),
    }
}
