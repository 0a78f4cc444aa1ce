use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tracing::info;

use crate::config::RunMode;
use crate::error::render_errors;
use crate::handlers;
use crate::profile::ProfileStore;
use crate::storage::FileStorage;

/// Transport ceiling for request bodies. Larger than the per-file limit so
/// oversized uploads reach the upload handler and get a proper envelope.
pub const MAX_REQUEST_SIZE: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub profile: Arc<ProfileStore>,
    pub storage: Arc<dyn FileStorage>,
    pub public_dir: Arc<PathBuf>,
    pub mode: RunMode,
}

impl AppState {
    pub fn new(
        profile: ProfileStore,
        storage: impl FileStorage + 'static,
        public_dir: impl Into<PathBuf>,
        mode: RunMode,
    ) -> Self {
        Self {
            profile: Arc::new(profile),
            storage: Arc::new(storage),
            public_dir: Arc::new(public_dir.into()),
            mode,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/api/profile/stats", get(handlers::profile_stats))
        .route("/api/upload/photo", post(handlers::upload_photo))
        .route("/api/upload/resume", post(handlers::upload_resume))
        .route("/api/upload/:filename", delete(handlers::delete_upload))
        .route("/uploads/:filename", get(handlers::serve_upload))
        .fallback(handlers::fallback)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .layer(middleware::from_fn_with_state(state.mode, render_errors))
        .with_state(state)
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
