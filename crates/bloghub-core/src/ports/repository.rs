use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ContactStatus, ContactSubmission, Post, PostPage, PostQuery, PostSummary, Subscriber};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Direct access to the `posts` table.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Filtered page ordered by publish date, newest first.
    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError>;

    /// Other posts in the same category.
    async fn related(
        &self,
        category: &str,
        exclude: Uuid,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError>;
}

/// Direct access to the `newsletter_subscribers` table.
#[async_trait]
pub trait SubscriberRepository: BaseRepository<Subscriber, Uuid> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, RepoError>;

    async fn delete_by_email(&self, email: &str) -> Result<u64, RepoError>;

    async fn list_all(&self) -> Result<Vec<Subscriber>, RepoError>;
}

/// Direct access to the `contact_submissions` table.
#[async_trait]
pub trait ContactRepository: BaseRepository<ContactSubmission, Uuid> {
    /// All submissions, newest first.
    async fn list_recent(&self) -> Result<Vec<ContactSubmission>, RepoError>;

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), RepoError>;
}
