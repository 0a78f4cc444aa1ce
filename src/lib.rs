pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod profile;
pub mod storage;
pub mod upload;

pub use app::{router, AppState};
pub use error::AppError;
pub use models::{ProfileRecord, ProfileStats, ProfileUpdate};
pub use profile::ProfileStore;
pub use storage::{FileStorage, LocalStorage, StorageError};
