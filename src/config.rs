use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Controls how much error detail reaches API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn exposes_error_detail(self) -> bool {
        self == RunMode::Development
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "profile-api", about = "Personal profile API with file uploads")]
pub struct ApiConfig {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    /// Directory uploaded files are written to.
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,
    /// Site assets served for non-API routes.
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,
    #[arg(long = "env", env = "APP_ENV", value_enum, default_value_t = RunMode::Production)]
    pub mode: RunMode,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "static-server", about = "Serves the profile site's static assets")]
pub struct StaticConfig {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,
}

/// Installs the fmt subscriber, honouring `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_defaults() {
        let config = ApiConfig::try_parse_from(["profile-api"]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.mode, RunMode::Production);
    }

    #[test]
    fn api_flags_override_defaults() {
        let config = ApiConfig::try_parse_from([
            "profile-api",
            "--port",
            "8080",
            "--env",
            "development",
            "--upload-dir",
            "/tmp/files",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.mode.exposes_error_detail());
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/files"));
    }
}
