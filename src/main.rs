use clap::Parser;
use profile_site::app::{self, AppState};
use profile_site::config::{self, ApiConfig};
use profile_site::{LocalStorage, ProfileRecord, ProfileStore};
use tracing::info;

fn starter_profile() -> ProfileRecord {
    let mut profile = ProfileRecord::new(
        "Alex Morgan",
        "Passionate developer skilled in Java, HTML, CSS, and Python. I love creating innovative solutions and learning new technologies.",
        vec!["Java".into(), "HTML".into(), "CSS".into(), "Python".into()],
    );
    profile.github_url = Some("https://github.com/alex-morgan".into());
    profile.email = Some("alex.morgan@example.com".into());
    profile.phone = Some("+1 (555) 123-4567".into());
    profile.location = Some("Kazakhstan".into());
    profile
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    config::init_tracing();
    let config = ApiConfig::parse();

    let state = AppState::new(
        ProfileStore::new(starter_profile()),
        LocalStorage::new(&config.upload_dir),
        config.public_dir.clone(),
        config.mode,
    );
    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        address = %listener.local_addr()?,
        uploads = %config.upload_dir.display(),
        mode = ?config.mode,
        "profile api running"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(app::shutdown_signal())
        .await?;
    info!("process terminated");
    Ok(())
}
