use std::borrow::Cow;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+]?[1-9][0-9\s\-\(\)]{7,15}$").unwrap());

const MAX_SKILL_LENGTH: usize = 50;

/// The single profile held by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: Uuid,
    pub name: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub github_url: Option<String>,
    pub photo_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    pub fn new(name: impl Into<String>, bio: impl Into<String>, skills: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            bio: bio.into(),
            skills,
            github_url: None,
            photo_url: None,
            email: None,
            phone: None,
            location: None,
            resume_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges every field present in `update`, leaving the rest untouched.
    pub(crate) fn apply(&mut self, update: ProfileUpdate) {
        let ProfileUpdate {
            name,
            bio,
            skills,
            github_url,
            email,
            phone,
            location,
        } = update;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(bio) = bio {
            self.bio = bio;
        }
        if let Some(skills) = skills {
            self.skills = skills;
        }
        if github_url.is_some() {
            self.github_url = github_url;
        }
        if email.is_some() {
            self.email = email;
        }
        if phone.is_some() {
            self.phone = phone;
        }
        if location.is_some() {
            self.location = location;
        }
    }

    /// Refreshes `updated_at` without ever moving it backwards.
    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

/// Body of `PUT /api/profile`.
///
/// `name` and `bio` must always be sent; every other field is merged only
/// when present. Unknown keys (including the upload-managed urls) are
/// rejected during deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
    #[validate(
        required(message = "\"name\" is required"),
        length(min = 2, max = 100, message = "\"name\" must be between 2 and 100 characters long")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "\"bio\" is required"),
        length(min = 10, max = 1000, message = "\"bio\" must be between 10 and 1000 characters long")
    )]
    pub bio: Option<String>,
    #[validate(
        length(min = 1, max = 20, message = "\"skills\" must contain between 1 and 20 items"),
        custom(function = "validate_skill_items")
    )]
    #[serde(default, deserialize_with = "non_null")]
    pub skills: Option<Vec<String>>,
    #[validate(url(message = "\"githubUrl\" must be a valid uri"))]
    #[serde(default, deserialize_with = "non_null")]
    pub github_url: Option<String>,
    #[validate(email(message = "\"email\" must be a valid email"))]
    #[serde(default, deserialize_with = "non_null")]
    pub email: Option<String>,
    #[validate(regex(path = *PHONE_PATTERN, message = "\"phone\" must be a valid phone number"))]
    #[serde(default, deserialize_with = "non_null")]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100, message = "\"location\" must be between 1 and 100 characters long"))]
    #[serde(default, deserialize_with = "non_null")]
    pub location: Option<String>,
}

/// Optional fields may be omitted but not sent as `null`.
fn non_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<T>::deserialize(deserializer)? {
        Some(value) => Ok(Some(value)),
        None => Err(de::Error::custom("optional fields must not be null")),
    }
}

fn validate_skill_items(skills: &[String]) -> Result<(), ValidationError> {
    let valid = skills
        .iter()
        .map(|skill| skill.chars().count())
        .all(|len| (1..=MAX_SKILL_LENGTH).contains(&len));
    if valid {
        return Ok(());
    }

    Err(ValidationError::new("skill_length").with_message(Cow::Borrowed(
        "each item of \"skills\" must be between 1 and 50 characters long",
    )))
}

/// Flattens validator output into human readable messages, ordered by field.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("\"{field}\" is invalid"),
            })
        })
        .collect()
}

/// Dashboard summary derived from the current profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    /// Mock figure, regenerated on every request.
    pub profile_views: u32,
    pub last_updated: DateTime<Utc>,
    pub skills_count: usize,
    pub has_resume: bool,
    pub has_photo: bool,
}

impl ProfileStats {
    pub fn from_record(record: &ProfileRecord, profile_views: u32) -> Self {
        Self {
            profile_views,
            last_updated: record.updated_at,
            skills_count: record.skills.len(),
            has_resume: record.resume_url.is_some(),
            has_photo: record.photo_url.is_some(),
        }
    }
}
