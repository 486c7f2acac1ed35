use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reader comment attached to a post. Kept only in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author: &str, body: &str) -> Self {
        let author = author.trim();
        Self {
            id: Uuid::new_v4(),
            post_id,
            author: if author.is_empty() {
                "Anonymous".to_string()
            } else {
                author.to_string()
            },
            body: body.trim().to_string(),
            created_at: Utc::now(),
        }
    }
}
