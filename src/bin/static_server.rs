use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use clap::Parser;
use profile_site::app::shutdown_signal;
use profile_site::assets::{self, AssetError};
use profile_site::config::{self, StaticConfig};
use tracing::{error, info};

async fn serve_asset(State(root): State<Arc<PathBuf>>, request: Request) -> Response {
    match assets::load(&root, request.uri().path()).await {
        Ok(asset) => asset.into_response(),
        Err(AssetError::NotFound) => (StatusCode::NOT_FOUND, "File not found").into_response(),
        Err(err) => {
            error!(error = %err, path = %request.uri().path(), "failed to read asset");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    info!("{} {}", request.method(), request.uri());
    next.run(request).await
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    config::init_tracing();
    let config = StaticConfig::parse();

    let app = Router::new()
        .fallback(serve_asset)
        .layer(middleware::from_fn(log_request))
        .with_state(Arc::new(config.public_dir.clone()));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        address = %listener.local_addr()?,
        root = %config.public_dir.display(),
        "static server running"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("process terminated");
    Ok(())
}
