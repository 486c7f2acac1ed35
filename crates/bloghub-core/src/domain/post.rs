use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Average reading speed used for the read-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;

/// Where a post record came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOrigin {
    /// Served or accepted by the remote function or the data store.
    #[default]
    Remote,
    /// Synthesized on this device while every backend tier was failing.
    Local,
}

/// Post entity - a published blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    /// Rich text / HTML body.
    pub content: String,
    /// Free-text category label, matched to categories by name only.
    pub category: String,
    pub author: String,
    #[serde(default)]
    pub author_avatar: Option<String>,
    pub image_url: String,
    /// Publish date.
    pub date: DateTime<Utc>,
    /// Human readable estimate, e.g. `"5 min read"`.
    pub read_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub origin: RecordOrigin,
}

impl Post {
    pub fn is_local(&self) -> bool {
        self.origin == RecordOrigin::Local
    }

    /// Reading time in minutes, parsed back out of `read_time`.
    pub fn read_time_minutes(&self) -> u32 {
        self.read_time
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or_else(|| estimate_read_time(&self.content))
    }

    /// Summary used for "related posts" listings.
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            id: self.id,
            title: self.title.clone(),
            excerpt: self.excerpt.clone(),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            date: self.date,
        }
    }
}

/// Reduced post projection returned alongside a post as related reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub image_url: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

/// A post together with up to three related posts from the same category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    #[serde(default)]
    pub related: Vec<PostSummary>,
}

/// Input for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: String,
    pub author: String,
    #[serde(default)]
    pub author_avatar: Option<String>,
}

impl NewPost {
    /// All of title, excerpt, content, category and image URL are required.
    pub fn validate(&self) -> Result<(), DomainError> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("excerpt", &self.excerpt),
            ("content", &self.content),
            ("category", &self.category),
            ("image_url", &self.image_url),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Build a full record, stamping id, dates and read time.
    pub fn into_post(self, origin: RecordOrigin) -> Post {
        let now = Utc::now();
        let read_time = format_read_time(estimate_read_time(&self.content));
        Post {
            id: Uuid::new_v4(),
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            category: self.category,
            author: self.author,
            author_avatar: self.author_avatar,
            image_url: self.image_url,
            date: now,
            read_time,
            created_at: now,
            updated_at: now,
            origin,
        }
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
    }

    /// Overwrite the given post in place. A content change recomputes the read time.
    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            post.excerpt = excerpt.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
            post.read_time = format_read_time(estimate_read_time(content));
        }
        if let Some(category) = &self.category {
            post.category = category.clone();
        }
        if let Some(image_url) = &self.image_url {
            post.image_url = image_url.clone();
        }
        post.updated_at = Utc::now();
    }
}

/// Estimated minutes to read `content`: `max(1, ceil(words / 200))`.
pub fn estimate_read_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

pub fn format_read_time(minutes: u32) -> String {
    format!("{minutes} min read")
}
