use rand::Rng;
use tokio::sync::RwLock;
use validator::Validate;

use crate::error::AppError;
use crate::models::{validation_messages, ProfileRecord, ProfileStats, ProfileUpdate};

/// Owns the one profile record. Every mutation holds the write lock for the
/// whole read-merge-write, so concurrent writers resolve last-write-wins.
#[derive(Debug)]
pub struct ProfileStore {
    record: RwLock<ProfileRecord>,
}

impl ProfileStore {
    pub fn new(initial: ProfileRecord) -> Self {
        Self {
            record: RwLock::new(initial),
        }
    }

    pub async fn get(&self) -> ProfileRecord {
        self.record.read().await.clone()
    }

    /// Validates `update` and merges it. On failure the record is untouched.
    pub async fn update(&self, update: ProfileUpdate) -> Result<ProfileRecord, AppError> {
        update
            .validate()
            .map_err(|errors| AppError::Validation(validation_messages(&errors)))?;

        let mut record = self.record.write().await;
        record.apply(update);
        record.touch();
        Ok(record.clone())
    }

    pub async fn set_photo_url(&self, url: impl Into<String>) -> ProfileRecord {
        let mut record = self.record.write().await;
        record.photo_url = Some(url.into());
        record.touch();
        record.clone()
    }

    pub async fn set_resume_url(&self, url: impl Into<String>) -> ProfileRecord {
        let mut record = self.record.write().await;
        record.resume_url = Some(url.into());
        record.touch();
        record.clone()
    }

    pub async fn stats(&self) -> ProfileStats {
        let profile_views = rand::thread_rng().gen_range(100..1100);
        let record = self.record.read().await;
        ProfileStats::from_record(&record, profile_views)
    }
}
