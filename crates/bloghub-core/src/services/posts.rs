//! Post service - tiered reads and writes for blog posts.

use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{LocalCache, keys};
use crate::domain::{NewPost, Post, PostDetail, PostPage, PostPatch, PostQuery, RecordOrigin};
use crate::error::DomainError;
use crate::fetch::{Attempts, FetchError, FetchOrchestrator, Fetched, Tier};
use crate::ports::{
    AppEvent, BaseRepository, EventBus, NewsletterReceipt, PostRepository, RemoteFunctions,
};

const RELATED_LIMIT: usize = 3;

/// Outcome of replaying the local write queue.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// `(local_id, backend_id)` for every post that was accepted.
    pub synced: Vec<(Uuid, Uuid)>,
    /// Local posts still waiting for a backend.
    pub pending: usize,
}

/// Posts through the remote function, data store and local cache tiers.
pub struct PostService {
    orchestrator: FetchOrchestrator,
    remote: Option<Arc<dyn RemoteFunctions>>,
    store: Option<Arc<dyn PostRepository>>,
    cache: LocalCache,
    bus: Arc<dyn EventBus>,
}

impl PostService {
    pub fn new(orchestrator: FetchOrchestrator, cache: LocalCache, bus: Arc<dyn EventBus>) -> Self {
        Self {
            orchestrator,
            remote: None,
            store: None,
            cache,
            bus,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteFunctions>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn PostRepository>) -> Self {
        self.store = Some(store);
        self
    }

    /// List posts, reporting which tier answered.
    pub async fn fetch_posts(&self, query: &PostQuery) -> Result<Fetched<PostPage>, FetchError> {
        let mut attempts = Attempts::new();
        if let Some(remote) = &self.remote {
            attempts = attempts.tier(Tier::RemoteFunction, remote.list_posts(query));
        }
        if let Some(store) = &self.store {
            attempts = attempts.tier(Tier::DataStore, async move {
                store.list(query).await.map_err(FetchError::from)
            });
        }
        attempts = attempts.tier(Tier::LocalCache, self.local_page(query));

        let fetched = self.orchestrator.execute("list_posts", attempts).await?;
        if fetched.tier != Tier::LocalCache {
            self.write_through(&fetched.value.posts).await;
        }
        Ok(fetched)
    }

    /// List posts; an empty page when every tier failed.
    pub async fn list_posts(&self, query: &PostQuery) -> PostPage {
        match self.fetch_posts(query).await {
            Ok(fetched) => fetched.value,
            Err(e) => {
                tracing::error!(error = %e, "Unable to list posts from any tier");
                PostPage::empty(query)
            }
        }
    }

    /// Fetch one post with related reading, reporting which tier answered.
    pub async fn fetch_post(&self, id: Uuid) -> Result<Fetched<PostDetail>, FetchError> {
        let mut attempts = Attempts::new();
        if let Some(remote) = &self.remote {
            attempts = attempts.tier(Tier::RemoteFunction, remote.get_post(id));
        }
        if let Some(store) = &self.store {
            attempts = attempts.tier(Tier::DataStore, async move {
                let post = store.find_by_id(id).await?.ok_or(FetchError::NotFound)?;
                let related = store
                    .related(&post.category, post.id, RELATED_LIMIT as u64)
                    .await?;
                Ok::<_, FetchError>(PostDetail { post, related })
            });
        }
        attempts = attempts.tier(Tier::LocalCache, self.local_detail(id));

        let fetched = self.orchestrator.execute("get_post", attempts).await?;
        if fetched.tier != Tier::LocalCache {
            self.write_through(std::slice::from_ref(&fetched.value.post))
                .await;
        }
        Ok(fetched)
    }

    /// Fetch one post; `None` when no tier has it.
    pub async fn get_post(&self, id: Uuid) -> Option<PostDetail> {
        match self.fetch_post(id).await {
            Ok(fetched) => Some(fetched.value),
            Err(e) if e.is_not_found() => {
                tracing::debug!(post_id = %id, "Post not found");
                None
            }
            Err(e) => {
                tracing::error!(post_id = %id, error = %e, "Unable to load post from any tier");
                None
            }
        }
    }

    /// Create a post. When both backends fail the post is synthesized
    /// locally and queued under `local_posts`.
    pub async fn create_post(&self, draft: NewPost) -> Result<Fetched<Post>, DomainError> {
        draft.validate()?;

        let mut attempts = Attempts::new();
        if let Some(remote) = &self.remote {
            attempts = attempts.tier(Tier::RemoteFunction, remote.create_post(&draft));
        }
        if let Some(store) = &self.store {
            let record = draft.clone().into_post(RecordOrigin::Remote);
            attempts = attempts.tier(Tier::DataStore, async move {
                store.save(record).await.map_err(FetchError::from)
            });
        }
        attempts = attempts.tier(Tier::LocalCache, self.synthesize(draft.clone()));

        let fetched = self.orchestrator.execute("create_post", attempts).await?;
        if fetched.value.is_local() {
            tracing::warn!(post_id = %fetched.value.id, "Post saved locally, pending sync");
        } else {
            self.write_through(std::slice::from_ref(&fetched.value))
                .await;
        }

        self.bus.publish(AppEvent::PostCreated(fetched.value.clone()));
        Ok(fetched)
    }

    pub async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::Validation("No fields to update".to_string()));
        }

        let mut attempts = Attempts::new();
        if let Some(remote) = &self.remote {
            attempts = attempts.tier(Tier::RemoteFunction, remote.update_post(id, &patch));
        }
        if let Some(store) = &self.store {
            attempts = attempts.tier(Tier::DataStore, async {
                let mut post = store.find_by_id(id).await?.ok_or(FetchError::NotFound)?;
                patch.apply(&mut post);
                Ok::<_, FetchError>(store.save(post).await?)
            });
        }
        attempts = attempts.tier(Tier::LocalCache, self.patch_local(id, &patch));

        let fetched = self
            .orchestrator
            .execute("update_post", attempts)
            .await
            .map_err(|e| not_found_or(e, id))?;
        let post = fetched.value;

        if fetched.tier != Tier::LocalCache {
            self.write_through(std::slice::from_ref(&post)).await;
        }
        self.bus.publish(AppEvent::PostUpdated(post.clone()));
        Ok(post)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), DomainError> {
        let mut attempts = Attempts::new();
        if let Some(remote) = &self.remote {
            attempts = attempts.tier(Tier::RemoteFunction, remote.delete_post(id));
        }
        if let Some(store) = &self.store {
            attempts = attempts.tier(Tier::DataStore, async move {
                store.delete(id).await.map_err(FetchError::from)
            });
        }
        attempts = attempts.tier(Tier::LocalCache, self.remove_local(id));

        let fetched = self
            .orchestrator
            .execute("delete_post", attempts)
            .await
            .map_err(|e| not_found_or(e, id))?;

        // The cached copies are stale either way.
        if fetched.tier != Tier::LocalCache {
            if let Err(e) = self.remove_local(id).await {
                tracing::debug!(post_id = %id, error = %e, "No cached copy to purge");
            }
        }

        self.bus.publish(AppEvent::PostDeleted { id });
        Ok(())
    }

    /// Send a post to every subscriber. Only the remote function can do this.
    pub async fn send_newsletter(&self, post_id: Uuid) -> Result<NewsletterReceipt, DomainError> {
        let mut attempts = Attempts::new();
        if let Some(remote) = &self.remote {
            attempts = attempts.tier(Tier::RemoteFunction, remote.send_newsletter(post_id));
        }

        let receipt = self
            .orchestrator
            .execute("send_newsletter", attempts)
            .await
            .map_err(|e| not_found_or(e, post_id))?
            .value;

        tracing::info!(
            post_id = %post_id,
            recipients = receipt.recipients.len(),
            "Newsletter sent"
        );
        Ok(receipt)
    }

    /// Posts synthesized locally and not yet accepted by a backend.
    pub async fn local_posts(&self) -> Vec<Post> {
        self.cache.list_or_empty(keys::LOCAL_POSTS).await
    }

    /// Replay locally synthesized posts through the backend tiers.
    ///
    /// Accepted posts leave the queue and publish `PostSynced`; the rest stay.
    pub async fn reconcile_local_posts(&self) -> Result<ReconcileReport, DomainError> {
        let queued: Vec<Post> = self.cache.list(keys::LOCAL_POSTS).await?;
        let mut report = ReconcileReport::default();

        for local in queued {
            let draft = NewPost {
                title: local.title.clone(),
                excerpt: local.excerpt.clone(),
                content: local.content.clone(),
                category: local.category.clone(),
                image_url: local.image_url.clone(),
                author: local.author.clone(),
                author_avatar: local.author_avatar.clone(),
            };

            let mut attempts = Attempts::new();
            if let Some(remote) = &self.remote {
                attempts = attempts.tier(Tier::RemoteFunction, remote.create_post(&draft));
            }
            if let Some(store) = &self.store {
                let mut record = local.clone();
                record.origin = RecordOrigin::Remote;
                attempts = attempts.tier(Tier::DataStore, async move {
                    store.save(record).await.map_err(FetchError::from)
                });
            }

            match self.orchestrator.execute("reconcile_post", attempts).await {
                Ok(fetched) => {
                    let post = fetched.value;
                    self.cache
                        .update_list(keys::LOCAL_POSTS, |items: &mut Vec<Post>| {
                            items.retain(|p| p.id != local.id)
                        })
                        .await?;
                    self.write_through(std::slice::from_ref(&post)).await;

                    tracing::info!(local_id = %local.id, post_id = %post.id, "Local post synced");
                    report.synced.push((local.id, post.id));
                    self.bus.publish(AppEvent::PostSynced {
                        local_id: local.id,
                        post,
                    });
                }
                Err(e) => {
                    tracing::warn!(local_id = %local.id, error = %e, "Local post still pending");
                    report.pending += 1;
                }
            }
        }

        Ok(report)
    }

    /// Cached and local posts, local ones first, deduplicated by id.
    async fn known_posts(&self) -> Result<Vec<Post>, FetchError> {
        let mut posts: Vec<Post> = self.cache.list(keys::LOCAL_POSTS).await?;
        let cached: Vec<Post> = self.cache.list(keys::POSTS_CACHE).await?;
        for post in cached {
            if !posts.iter().any(|p| p.id == post.id) {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    async fn local_page(&self, query: &PostQuery) -> Result<PostPage, FetchError> {
        Ok(query.apply(self.known_posts().await?))
    }

    async fn local_detail(&self, id: Uuid) -> Result<PostDetail, FetchError> {
        let posts = self.known_posts().await?;
        let post = posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(FetchError::NotFound)?;
        let related = posts
            .iter()
            .filter(|p| p.category == post.category && p.id != id)
            .take(RELATED_LIMIT)
            .map(Post::summary)
            .collect();
        Ok(PostDetail { post, related })
    }

    async fn synthesize(&self, draft: NewPost) -> Result<Post, FetchError> {
        let post = draft.into_post(RecordOrigin::Local);
        let queued = post.clone();
        self.cache
            .update_list(keys::LOCAL_POSTS, move |items: &mut Vec<Post>| {
                items.insert(0, queued)
            })
            .await?;
        Ok(post)
    }

    async fn patch_local(&self, id: Uuid, patch: &PostPatch) -> Result<Post, FetchError> {
        for key in [keys::LOCAL_POSTS, keys::POSTS_CACHE] {
            let updated = self
                .cache
                .update_list(key, |items: &mut Vec<Post>| {
                    items.iter_mut().find(|p| p.id == id).map(|post| {
                        patch.apply(post);
                        post.clone()
                    })
                })
                .await?;
            if let Some(post) = updated {
                return Ok(post);
            }
        }
        Err(FetchError::NotFound)
    }

    async fn remove_local(&self, id: Uuid) -> Result<(), FetchError> {
        let mut removed = false;
        for key in [keys::LOCAL_POSTS, keys::POSTS_CACHE] {
            removed |= self
                .cache
                .update_list(key, |items: &mut Vec<Post>| {
                    let before = items.len();
                    items.retain(|p| p.id != id);
                    items.len() != before
                })
                .await?;
        }
        if removed { Ok(()) } else { Err(FetchError::NotFound) }
    }

    /// Upsert backend-served posts into `posts_cache`. Failures are logged only.
    async fn write_through(&self, posts: &[Post]) {
        if posts.is_empty() {
            return;
        }
        let result = self
            .cache
            .update_list(keys::POSTS_CACHE, |items: &mut Vec<Post>| {
                for post in posts {
                    match items.iter_mut().find(|p| p.id == post.id) {
                        Some(existing) => *existing = post.clone(),
                        None => items.push(post.clone()),
                    }
                }
            })
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, count = posts.len(), "Failed to write posts through to cache");
        }
    }
}

fn not_found_or(err: FetchError, id: Uuid) -> DomainError {
    if err.is_not_found() {
        DomainError::not_found("post", id)
    } else {
        DomainError::from(err)
    }
}
