//! Remote function port - the primary tier of the fetch chain.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Post, PostDetail, PostPage, PostPatch, PostQuery};
use crate::fetch::FetchError;

/// Outcome of a newsletter send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterReceipt {
    pub message: String,
    pub recipients: Vec<String>,
}

/// Hosted per-operation endpoints, one method per function.
#[async_trait]
pub trait RemoteFunctions: Send + Sync {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, FetchError>;

    async fn get_post(&self, id: Uuid) -> Result<PostDetail, FetchError>;

    async fn create_post(&self, post: &NewPost) -> Result<Post, FetchError>;

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Post, FetchError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), FetchError>;

    async fn send_newsletter(&self, post_id: Uuid) -> Result<NewsletterReceipt, FetchError>;
}
