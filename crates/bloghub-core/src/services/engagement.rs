//! Per-post likes, bookmarks and comments. These never leave the device.

use std::collections::HashMap;

use uuid::Uuid;

use crate::cache::{LocalCache, keys};
use crate::domain::Comment;
use crate::error::DomainError;

type FlagMap = HashMap<Uuid, bool>;

pub struct EngagementService {
    cache: LocalCache,
}

impl EngagementService {
    pub fn new(cache: LocalCache) -> Self {
        Self { cache }
    }

    /// Flip the like flag; returns the new state.
    pub async fn toggle_like(&self, post_id: Uuid) -> Result<bool, DomainError> {
        self.toggle(keys::LIKED_POSTS, post_id).await
    }

    pub async fn is_liked(&self, post_id: Uuid) -> bool {
        self.flag(keys::LIKED_POSTS, post_id).await
    }

    /// Flip the bookmark flag; returns the new state.
    pub async fn toggle_bookmark(&self, post_id: Uuid) -> Result<bool, DomainError> {
        self.toggle(keys::BOOKMARKED_POSTS, post_id).await
    }

    pub async fn is_bookmarked(&self, post_id: Uuid) -> bool {
        self.flag(keys::BOOKMARKED_POSTS, post_id).await
    }

    pub async fn bookmarked_posts(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .flags(keys::BOOKMARKED_POSTS)
            .await
            .into_iter()
            .filter_map(|(id, on)| on.then_some(id))
            .collect();
        ids.sort();
        ids
    }

    /// Comments on a post, oldest first.
    pub async fn comments(&self, post_id: Uuid) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self.cache.list_or_empty(&keys::comments(post_id)).await;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        author: &str,
        body: &str,
    ) -> Result<Comment, DomainError> {
        if body.trim().is_empty() {
            return Err(DomainError::Validation("Comment cannot be empty".to_string()));
        }

        let comment = Comment::new(post_id, author, body);
        let entry = comment.clone();
        self.cache
            .update_list(&keys::comments(post_id), move |items: &mut Vec<Comment>| {
                items.push(entry)
            })
            .await?;

        tracing::debug!(post_id = %post_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    async fn flags(&self, key: &str) -> FlagMap {
        match self.cache.get_json::<FlagMap>(key).await {
            Ok(flags) => flags.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read engagement flags");
                FlagMap::new()
            }
        }
    }

    async fn flag(&self, key: &str, post_id: Uuid) -> bool {
        self.flags(key).await.get(&post_id).copied().unwrap_or(false)
    }

    async fn toggle(&self, key: &str, post_id: Uuid) -> Result<bool, DomainError> {
        let mut flags: FlagMap = self.cache.get_json(key).await?.unwrap_or_default();
        let state = !flags.get(&post_id).copied().unwrap_or(false);
        flags.insert(post_id, state);
        self.cache.set_json(key, &flags).await?;
        Ok(state)
    }
}
