//! Remote functions over HTTPS.
//!
//! Each operation is one hosted function at `<base>/functions/v1/<name>`.
//! Responses are the payload itself on success and `{ "error": "..." }`
//! otherwise.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use bloghub_core::domain::{
    NewPost, Pagination, Post, PostDetail, PostPage, PostPatch, PostQuery, PostSummary,
    RecordOrigin, estimate_read_time, format_read_time,
};
use bloghub_core::fetch::FetchError;
use bloghub_core::ports::{NewsletterReceipt, RemoteFunctions};
use bloghub_shared::FunctionResponse;
use bloghub_shared::dto::{
    CreatePostRequest, ListPostsParams, PostDetailResponse, PostListResponse, PostRecord,
    PostResponse, RelatedPostRecord, SendNewsletterRequest, SendNewsletterResponse,
    SuccessResponse, UpdatePostRequest,
};

/// Remote function endpoint configuration.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project base URL (e.g., https://xyz.supabase.co)
    pub base_url: String,
    /// Public API key sent as `apikey`
    pub anon_key: String,
    /// Signed-in user's token; the anon key is used as bearer when absent
    pub access_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `BLOGHUB_FUNCTIONS_URL` is unset, which disables
    /// the remote tier.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("BLOGHUB_FUNCTIONS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())?;

        Some(Self {
            base_url,
            anon_key: std::env::var("BLOGHUB_ANON_KEY").unwrap_or_default(),
            access_token: std::env::var("BLOGHUB_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(
                std::env::var("BLOGHUB_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        })
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }
}

/// `RemoteFunctions` backed by reqwest.
pub struct HttpRemoteFunctions {
    client: Client,
    config: RemoteConfig,
}

impl HttpRemoteFunctions {
    pub fn new(config: RemoteConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        tracing::info!(base_url = %config.base_url, "Remote functions configured");

        Ok(Self { client, config })
    }

    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/functions/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            name
        )
    }

    fn request(&self, method: reqwest::Method, name: &str) -> RequestBuilder {
        self.client
            .request(method, self.endpoint(name))
            .bearer_auth(self.config.bearer())
            .header("apikey", &self.config.anon_key)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        name: &'static str,
        request: RequestBuilder,
    ) -> Result<T, FetchError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(function = name, error = %e, "Remote function unreachable");
            FetchError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        tracing::debug!(function = name, status, "Remote function responded");
        decode(status, &body)
    }
}

/// Interpret a function response body.
pub(crate) fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, FetchError> {
    let parsed = serde_json::from_str::<FunctionResponse<T>>(body);

    if !(200..300).contains(&status) {
        if status == 404 {
            return Err(FetchError::NotFound);
        }
        let message = match parsed {
            Ok(FunctionResponse::Failure { error }) => error,
            _ => body.trim().to_string(),
        };
        return Err(FetchError::Remote { status, message });
    }

    match parsed {
        Ok(response) => response
            .into_result()
            .map_err(|message| FetchError::Remote { status, message }),
        Err(e) => Err(FetchError::Decode(e.to_string())),
    }
}

/// Records without any timestamp are dated at the epoch, so repeated reads
/// of the same record map to the same post.
pub(crate) fn post_from_record(record: PostRecord) -> Post {
    let (joined_name, joined_avatar) = match record.users {
        Some(user) => (user.name, user.avatar_url),
        None => (None, None),
    };

    let author = joined_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(record.author);
    let read_time = record
        .read_time
        .filter(|rt| !rt.trim().is_empty())
        .unwrap_or_else(|| format_read_time(estimate_read_time(&record.content)));
    let created_at = record
        .created_at
        .or(record.date)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Post {
        id: record.id,
        title: record.title,
        excerpt: record.excerpt,
        content: record.content,
        category: record.category,
        author,
        author_avatar: record.author_avatar.or(joined_avatar),
        image_url: record.image_url,
        date: record.date.unwrap_or(created_at),
        read_time,
        created_at,
        updated_at: record.updated_at.unwrap_or(created_at),
        origin: RecordOrigin::Remote,
    }
}

fn summary_from_record(record: RelatedPostRecord) -> PostSummary {
    PostSummary {
        id: record.id,
        title: record.title,
        excerpt: record.excerpt,
        image_url: record.image_url,
        category: record.category,
        date: record.date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    }
}

pub(crate) fn list_params(query: &PostQuery) -> ListPostsParams {
    let query = query.clone().normalized();
    ListPostsParams {
        page: query.page,
        limit: query.limit,
        category: query.category.filter(|c| !c.is_empty()),
        search: query.search.filter(|s| !s.trim().is_empty()),
    }
}

pub(crate) fn page_from_response(response: PostListResponse) -> PostPage {
    let p = response.pagination;
    let mut pagination = Pagination::new(p.page, p.limit, p.total);
    if p.pages > 0 {
        pagination.pages = p.pages;
    }

    PostPage {
        posts: response.posts.into_iter().map(post_from_record).collect(),
        pagination,
    }
}

#[async_trait]
impl RemoteFunctions for HttpRemoteFunctions {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, FetchError> {
        let request = self
            .request(reqwest::Method::GET, "get-posts")
            .query(&list_params(query));

        let response: PostListResponse = self.call("get-posts", request).await?;
        Ok(page_from_response(response))
    }

    async fn get_post(&self, id: Uuid) -> Result<PostDetail, FetchError> {
        let request = self
            .request(reqwest::Method::GET, "get-post")
            .query(&[("id", id.to_string())]);

        let response: PostDetailResponse = self.call("get-post", request).await?;
        Ok(PostDetail {
            post: post_from_record(response.post),
            related: response
                .related_posts
                .into_iter()
                .map(summary_from_record)
                .collect(),
        })
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, FetchError> {
        let body = CreatePostRequest {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            category: post.category.clone(),
            image_url: post.image_url.clone(),
        };
        let request = self.request(reqwest::Method::POST, "create-post").json(&body);

        let response: PostResponse = self.call("create-post", request).await?;
        Ok(post_from_record(response.post))
    }

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Post, FetchError> {
        let body = UpdatePostRequest {
            id,
            title: patch.title.clone(),
            excerpt: patch.excerpt.clone(),
            content: patch.content.clone(),
            category: patch.category.clone(),
            image_url: patch.image_url.clone(),
        };
        let request = self.request(reqwest::Method::PUT, "update-post").json(&body);

        let response: PostResponse = self.call("update-post", request).await?;
        Ok(post_from_record(response.post))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), FetchError> {
        let request = self
            .request(reqwest::Method::DELETE, "delete-post")
            .query(&[("id", id.to_string())]);

        let response: SuccessResponse = self.call("delete-post", request).await?;
        if response.success {
            Ok(())
        } else {
            Err(FetchError::Remote {
                status: 200,
                message: "delete-post reported failure".to_string(),
            })
        }
    }

    async fn send_newsletter(&self, post_id: Uuid) -> Result<NewsletterReceipt, FetchError> {
        let request = self
            .request(reqwest::Method::POST, "send-newsletter")
            .json(&SendNewsletterRequest { post_id });

        let response: SendNewsletterResponse = self.call("send-newsletter", request).await?;
        if !response.success {
            return Err(FetchError::Remote {
                status: 200,
                message: response.message,
            });
        }

        Ok(NewsletterReceipt {
            message: response.message,
            recipients: response.recipients,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloghub_shared::dto::AuthorRecord;

    fn record(content: &str) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            title: "Async Rust".to_string(),
            excerpt: "Futures explained".to_string(),
            content: content.to_string(),
            category: "Technology".to_string(),
            author: "0b6c7e1a-author-id".to_string(),
            author_avatar: None,
            image_url: "https://example.com/a.jpg".to_string(),
            read_time: None,
            date: None,
            created_at: Some(Utc::now()),
            updated_at: None,
            users: None,
        }
    }

    #[test]
    fn test_decode_payload() {
        let body = r#"{"success":true}"#;
        let response: SuccessResponse = decode(200, body).unwrap();
        assert!(response.success);
    }

    #[test]
    fn test_decode_error_field_is_remote_failure() {
        let body = r#"{"error":"Only admins can delete posts"}"#;
        let err = decode::<SuccessResponse>(403, body).unwrap_err();
        match err {
            FetchError::Remote { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Only admins can delete posts");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // An error body with a 2xx status is still a failure
        assert!(matches!(
            decode::<SuccessResponse>(200, r#"{"error":"boom"}"#),
            Err(FetchError::Remote { status: 200, .. })
        ));
    }

    #[test]
    fn test_decode_not_found_and_garbage() {
        assert!(matches!(
            decode::<PostResponse>(404, r#"{"error":"Post not found"}"#),
            Err(FetchError::NotFound)
        ));
        assert!(matches!(
            decode::<PostResponse>(200, "<html>gateway</html>"),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(
            decode::<PostResponse>(502, "Bad Gateway"),
            Err(FetchError::Remote { status: 502, .. })
        ));
    }

    #[test]
    fn test_post_from_record_fills_gaps() {
        let mut rec = record(&vec!["word"; 1000].join(" "));
        rec.users = Some(AuthorRecord {
            name: Some("Jane Doe".to_string()),
            avatar_url: Some("https://example.com/jane.png".to_string()),
        });
        let created = rec.created_at;

        let post = post_from_record(rec);

        assert_eq!(post.author, "Jane Doe");
        assert_eq!(post.author_avatar.as_deref(), Some("https://example.com/jane.png"));
        assert_eq!(post.read_time, "5 min read");
        assert_eq!(Some(post.date), created);
        assert_eq!(post.updated_at, post.created_at);
        assert_eq!(post.origin, RecordOrigin::Remote);
    }

    #[test]
    fn test_undated_record_maps_the_same_every_time() {
        let mut rec = record("short");
        rec.created_at = None;

        let first = post_from_record(rec.clone());
        let second = post_from_record(rec);

        assert_eq!(first, second);
        assert_eq!(first.date, DateTime::<Utc>::UNIX_EPOCH);

        let related = RelatedPostRecord {
            id: Uuid::new_v4(),
            title: "Pinning".to_string(),
            excerpt: "Self-referential futures".to_string(),
            image_url: "https://example.com/b.jpg".to_string(),
            category: "Technology".to_string(),
            date: None,
        };
        assert_eq!(summary_from_record(related.clone()), summary_from_record(related));
    }

    #[test]
    fn test_post_from_record_keeps_stored_read_time() {
        let mut rec = record("short");
        rec.read_time = Some("12 min read".to_string());
        assert_eq!(post_from_record(rec).read_time, "12 min read");
    }

    #[test]
    fn test_list_params_drop_blank_filters() {
        let query = PostQuery::default().with_category("").with_search("  ").page(0);
        let params = list_params(&query);

        assert_eq!(params.page, 1);
        assert!(params.category.is_none());
        assert!(params.search.is_none());

        let encoded = serde_json::to_value(&params).unwrap();
        assert!(encoded.get("category").is_none());
    }

    #[test]
    fn test_page_from_list_response() {
        let body = serde_json::json!({
            "posts": [serde_json::to_value(record("body")).unwrap()],
            "pagination": { "page": 2, "limit": 1, "total": 3, "pages": 3 }
        });
        let response: PostListResponse = decode(200, &body.to_string()).unwrap();

        let page = page_from_response(response);
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.pagination.page, 2);
        assert_eq!(page.pagination.pages, 3);
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let remote = HttpRemoteFunctions::new(RemoteConfig {
            base_url: "https://project.example.co/".to_string(),
            anon_key: "anon".to_string(),
            access_token: None,
            timeout: Duration::from_secs(1),
        })
        .unwrap();

        assert_eq!(
            remote.endpoint("get-posts"),
            "https://project.example.co/functions/v1/get-posts"
        );
        assert_eq!(remote.config.bearer(), "anon");
    }
}
