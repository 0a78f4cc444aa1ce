use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::config::RunMode;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

const REDACTED_DETAIL: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    Validation(Vec<String>),
    #[error("Only images (JPEG, PNG, GIF) and PDF files are allowed")]
    UnsupportedFileType,
    #[error("No file uploaded")]
    MissingFile,
    #[error("File size too large. Maximum size is 5MB.")]
    PayloadTooLarge,
    #[error("File not found")]
    NotFound,
    #[error("Route not found")]
    RouteNotFound,
    #[error("{context}")]
    Internal {
        context: &'static str,
        #[source]
        source: BoxError,
    },
}

impl AppError {
    pub fn internal(context: &'static str, source: impl Into<BoxError>) -> Self {
        AppError::Internal {
            context,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::UnsupportedFileType
            | AppError::MissingFile
            | AppError::PayloadTooLarge => StatusCode::BAD_REQUEST,
            AppError::NotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope waiting to be rendered by [`render_errors`].
///
/// Handlers don't know the run mode, so the error travels as a response
/// extension and the middleware decides whether the raw detail is shown.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub message: String,
    pub errors: Option<Vec<String>>,
    pub detail: Option<String>,
}

impl From<AppError> for ErrorReport {
    fn from(error: AppError) -> Self {
        let status = error.status();
        let message = error.to_string();
        match error {
            AppError::Validation(errors) => ErrorReport {
                status,
                message,
                errors: Some(errors),
                detail: None,
            },
            AppError::Internal { source, .. } => ErrorReport {
                status,
                message,
                errors: None,
                detail: Some(source.to_string()),
            },
            _ => ErrorReport {
                status,
                message,
                errors: None,
                detail: None,
            },
        }
    }
}

impl ErrorReport {
    pub fn render(self, mode: RunMode) -> Response {
        let mut body = json!({
            "success": false,
            "message": self.message,
        });
        if let Some(errors) = self.errors {
            body["errors"] = json!(errors);
        }
        if let Some(detail) = self.detail {
            body["error"] = if mode.exposes_error_detail() {
                json!(detail)
            } else {
                json!(REDACTED_DETAIL)
            };
        }

        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal { context, source } = &self {
            tracing::error!(error = %source, "{context}");
        }

        let report = ErrorReport::from(self);
        let mut response = report.status.into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// Renders pending [`ErrorReport`]s. A known path hit with the wrong method
/// is unmatched as far as clients are concerned and gets the 404 envelope.
pub async fn render_errors(State(mode): State<RunMode>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => report.render(mode),
        None if response.status() == StatusCode::METHOD_NOT_ALLOWED => {
            ErrorReport::from(AppError::RouteNotFound).render(mode)
        }
        None => response,
    }
}
