//! Marketplace type definitions
//!
//! View models for the records the API hands out. The API owns these
//! entities; the client only reads them and submits replacement payloads.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BazaarError, Result};

/// Full user profile (`/api/users/me`, `/api/users/:id`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Self-chosen title shown next to the name (e.g. "Server Admin")
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Author/contributor reference embedded in other records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

/// Login/registration exchange result
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Plugin listing/detail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    /// HTML description
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub supported_versions: Vec<String>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub contributors: Vec<UserRef>,
    /// Newest first
    #[serde(default)]
    pub versions: Vec<PluginVersion>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Plugin {
    pub fn is_free(&self) -> bool {
        self.price <= 0.0
    }

    /// File name used when saving the jar locally
    pub fn jar_file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        let stem = stem.trim().trim_matches('.');
        if stem.is_empty() {
            format!("{}.jar", self.id)
        } else {
            format!("{}.jar", stem)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginVersion {
    pub version_number: String,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Plain text
    #[serde(default)]
    pub content: String,
    pub rating: u8,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub liked: bool,
}

/// `GET /api/plugins/:id/reviews`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub user_review: Option<Review>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReview {
    pub content: String,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForumCategory {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topic_count: Option<u32>,
}

/// A topic's category arrives either as a bare id or populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        name: String,
    },
    Id(String),
}

impl CategoryRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Populated { id, .. } | Self::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Populated { name, .. } => Some(name),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    /// HTML content
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reply_count: Option<u32>,
    #[serde(default)]
    pub view_count: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTopic {
    pub title: String,
    pub content: String,
    pub category_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// HTML content
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub like_count: u32,
    #[serde(default)]
    pub liked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReply {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub plugin_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    #[serde(default, rename = "_id", alias = "id")]
    pub id: Option<String>,
    #[serde(default)]
    pub plugin_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Text fields of the multipart `PUT /api/users/me`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub title: String,
}

impl ProfileUpdate {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
            location: user.location.clone().unwrap_or_default(),
            website: user.website.clone().unwrap_or_default(),
            title: user.title.clone().unwrap_or_default(),
        }
    }

    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("username", &self.username),
            ("email", &self.email),
            ("bio", &self.bio),
            ("location", &self.location),
            ("website", &self.website),
            ("title", &self.title),
        ]
    }
}

/// A file attached to a multipart submission
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                BazaarError::validation(format!("Not a file path: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { file_name, bytes })
    }

    pub fn has_extension(&self, ext: &str) -> bool {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(ext))
            .unwrap_or(false)
    }
}

/// Everything `POST /api/plugins` needs, ready to encode as multipart
#[derive(Debug, Clone)]
pub struct PluginDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub tags: Vec<String>,
    pub supported_versions: Vec<String>,
    pub contributor_ids: Vec<String>,
    pub version_number: String,
    pub version_changelog: String,
    pub thumbnail: Option<Upload>,
    pub jar: Upload,
}

/// "5 minutes ago" style rendering of a timestamp
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    if secs < 0 {
        return "just now".to_string();
    }

    let (value, unit) = match secs {
        0..=59 => return "just now".to_string(),
        60..=3_599 => (secs / 60, "minute"),
        3_600..=86_399 => (secs / 3_600, "hour"),
        86_400..=2_591_999 => (secs / 86_400, "day"),
        2_592_000..=31_535_999 => (secs / 2_592_000, "month"),
        _ => (secs / 31_536_000, "year"),
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}
