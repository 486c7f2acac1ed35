//! Data Transfer Objects - request/response bodies of the remote functions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query string of `get-posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPostsParams {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Author row joined onto a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// A row of the `posts` table as the functions return it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: String,
    /// Author id or display name, depending on the function version.
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<AuthorRecord>,
}

/// Reduced projection used for related posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedPostRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationDto {
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u64,
}

/// Response of `get-posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostRecord>,
    pub pagination: PaginationDto,
}

/// Response of `get-post`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostRecord,
    #[serde(rename = "relatedPosts", default)]
    pub related_posts: Vec<RelatedPostRecord>,
}

/// Body of `create-post`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub image_url: String,
}

/// Body of `update-post`; absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Response of `create-post` and `update-post`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub post: PostRecord,
}

/// Response of `delete-post`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Body of `send-newsletter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendNewsletterRequest {
    #[serde(rename = "postId")]
    pub post_id: Uuid,
}

/// Response of `send-newsletter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendNewsletterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub recipients: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_record_tolerates_missing_optional_columns() {
        let record: PostRecord = serde_json::from_value(serde_json::json!({
            "id": "6f1c2a4e-9d2b-4c59-9a57-0c1f9a3c2b11",
            "title": "Hello",
            "users": { "name": "Admin User" }
        }))
        .unwrap();

        assert_eq!(record.title, "Hello");
        assert!(record.read_time.is_none());
        assert_eq!(record.users.unwrap().name.as_deref(), Some("Admin User"));
    }

    #[test]
    fn test_detail_uses_camel_case_related_posts() {
        let response: PostDetailResponse = serde_json::from_value(serde_json::json!({
            "post": { "id": "6f1c2a4e-9d2b-4c59-9a57-0c1f9a3c2b11", "title": "Hello" },
            "relatedPosts": [
                { "id": "0d8f5e38-2f7e-4b0c-8c0a-4b3f0c1d2e3f", "title": "Other" }
            ]
        }))
        .unwrap();

        assert_eq!(response.related_posts.len(), 1);
    }

    #[test]
    fn test_update_request_omits_unchanged_fields() {
        let body = serde_json::to_value(UpdatePostRequest {
            id: Uuid::nil(),
            title: Some("New".to_string()),
            excerpt: None,
            content: None,
            category: None,
            image_url: None,
        })
        .unwrap();

        assert_eq!(body.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_newsletter_request_field_name() {
        let body = serde_json::to_value(SendNewsletterRequest { post_id: Uuid::nil() }).unwrap();
        assert!(body.get("postId").is_some());
    }
}
