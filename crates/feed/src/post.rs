use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfloor_core::{DomainError, DomainResult, Entity, PostId};

/// A published media post. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Post {
    type Id = PostId;
    const KIND: &'static str = "post";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Data needed to record a post after the media host accepted the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
}

impl NewPost {
    /// Normalise the caption (blank becomes `None`) and require the hosted fields.
    pub fn validated(self) -> DomainResult<Self> {
        let caption = self
            .caption
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        for (field, value) in [
            ("url", &self.url),
            ("file_type", &self.file_type),
            ("file_name", &self.file_name),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} cannot be empty")));
            }
        }
        Ok(Self { caption, ..self })
    }

    pub fn into_post(self, id: PostId, created_at: DateTime<Utc>) -> Post {
        Post {
            id,
            caption: self.caption,
            url: self.url,
            file_type: self.file_type,
            file_name: self.file_name,
            created_at,
        }
    }
}

/// Media families the feed accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Metadata of an incoming upload, checked before anything is staged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl UploadMeta {
    /// Returns the media family, or a validation error for empty or unsupported files.
    pub fn media_kind(&self) -> DomainResult<MediaKind> {
        if self.size == 0 {
            return Err(DomainError::validation("file is empty"));
        }
        if self.file_name.trim().is_empty() {
            return Err(DomainError::validation("file name is missing"));
        }
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.split_once('/') {
            Some(("image", sub)) if !sub.is_empty() => Ok(MediaKind::Image),
            Some(("video", sub)) if !sub.is_empty() => Ok(MediaKind::Video),
            _ => Err(DomainError::validation(format!(
                "unsupported content type '{}'; expected image/* or video/*",
                self.content_type
            ))),
        }
    }
}
