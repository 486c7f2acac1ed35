//! Test doubles for the ports, shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::cache::LocalCache;
use crate::domain::{
    ContactStatus, ContactSubmission, NewPost, Post, PostDetail, PostPage, PostPatch, PostQuery,
    PostSummary, RecordOrigin, Subscriber,
};
use crate::error::RepoError;
use crate::fetch::FetchError;
use crate::ports::{
    AppEvent, BaseRepository, CacheError, ContactRepository, EventBus, EventHandler, KeyValueStore,
    NewsletterReceipt, PostRepository, RemoteFunctions, SubscriberRepository, SubscriptionId,
    Topic,
};

pub fn new_post(title: &str, category: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        excerpt: format!("About {title}"),
        content: format!("{title} body text"),
        category: category.to_string(),
        image_url: "https://example.com/cover.jpg".to_string(),
        author: "Admin User".to_string(),
        author_avatar: None,
    }
}

pub fn post(title: &str, category: &str) -> Post {
    new_post(title, category).into_post(RecordOrigin::Remote)
}

/// In-memory key-value store that can be switched into a failing mode.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheError::Io("storage quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

pub fn local_cache() -> (LocalCache, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    (LocalCache::new(store.clone()), store)
}

/// Minimal synchronous bus that also records everything published.
#[derive(Default)]
pub struct TestBus {
    handlers: Mutex<Vec<(SubscriptionId, Topic, EventHandler)>>,
    next_id: AtomicU64,
    published: Mutex<Vec<AppEvent>>,
}

impl TestBus {
    pub fn published(&self) -> Vec<AppEvent> {
        self.published.lock().unwrap().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().unwrap().len()
    }
}

impl EventBus for TestBus {
    fn publish(&self, event: AppEvent) -> usize {
        self.published.lock().unwrap().push(event.clone());
        let handlers: Vec<EventHandler> = self
            .handlers
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, topic, _)| topic.accepts(event.kind()))
            .map(|(_, _, handler)| handler.clone())
            .collect();
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    fn subscribe(&self, topic: Topic, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().unwrap().push((id, topic, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock().unwrap();
        let before = handlers.len();
        handlers.retain(|(sid, _, _)| *sid != id);
        handlers.len() != before
    }
}

/// Remote functions backed by a map; `fail(true)` makes every call a transport error.
#[derive(Default)]
pub struct FakeRemote {
    pub posts: Mutex<HashMap<Uuid, Post>>,
    failing: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeRemote {
    pub fn failing() -> Self {
        let remote = Self::default();
        remote.fail(true);
        remote
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn insert(&self, post: Post) {
        self.posts.lock().unwrap().insert(post.id, post);
    }

    fn check(&self) -> Result<(), FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(FetchError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteFunctions for FakeRemote {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, FetchError> {
        self.check()?;
        let posts = self.posts.lock().unwrap().values().cloned().collect();
        Ok(query.apply(posts))
    }

    async fn get_post(&self, id: Uuid) -> Result<PostDetail, FetchError> {
        self.check()?;
        let posts = self.posts.lock().unwrap();
        let post = posts.get(&id).cloned().ok_or(FetchError::NotFound)?;
        let related = posts
            .values()
            .filter(|p| p.category == post.category && p.id != id)
            .take(3)
            .map(Post::summary)
            .collect();
        Ok(PostDetail { post, related })
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, FetchError> {
        self.check()?;
        let created = post.clone().into_post(RecordOrigin::Remote);
        self.insert(created.clone());
        Ok(created)
    }

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Post, FetchError> {
        self.check()?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts.get_mut(&id).ok_or(FetchError::NotFound)?;
        patch.apply(post);
        Ok(post.clone())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), FetchError> {
        self.check()?;
        self.posts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(FetchError::NotFound)
    }

    async fn send_newsletter(&self, post_id: Uuid) -> Result<NewsletterReceipt, FetchError> {
        self.check()?;
        if !self.posts.lock().unwrap().contains_key(&post_id) {
            return Err(FetchError::NotFound);
        }
        Ok(NewsletterReceipt {
            message: "Newsletter sent to 1 subscribers".to_string(),
            recipients: vec!["reader@example.com".to_string()],
        })
    }
}

/// Generic in-memory table used for the repository fakes.
pub struct FakeTable<T> {
    rows: Mutex<Vec<T>>,
    failing: AtomicBool,
}

impl<T> Default for FakeTable<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }
}

impl<T: Clone> FakeTable<T> {
    pub fn failing() -> Self {
        let table = Self::default();
        table.fail(true);
        table
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepoError::Connection("database unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Post {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Subscriber {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for ContactSubmission {
    fn key(&self) -> Uuid {
        self.id
    }
}

#[async_trait]
impl<T> BaseRepository<T, Uuid> for FakeTable<T>
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.key() == id)
            .cloned())
    }

    async fn save(&self, entity: T) -> Result<T, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|r| r.key() != entity.key());
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.key() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for FakeTable<Post> {
    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        self.check()?;
        Ok(query.apply(self.rows()))
    }

    async fn related(
        &self,
        category: &str,
        exclude: Uuid,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError> {
        self.check()?;
        Ok(self
            .rows()
            .iter()
            .filter(|p| p.category == category && p.id != exclude)
            .take(limit as usize)
            .map(Post::summary)
            .collect())
    }
}

#[async_trait]
impl SubscriberRepository for FakeTable<Subscriber> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, RepoError> {
        self.check()?;
        Ok(self.rows().into_iter().find(|s| s.email == email))
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.email != email);
        Ok((before - rows.len()) as u64)
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, RepoError> {
        self.check()?;
        Ok(self.rows())
    }
}

#[async_trait]
impl ContactRepository for FakeTable<ContactSubmission> {
    async fn list_recent(&self) -> Result<Vec<ContactSubmission>, RepoError> {
        self.check()?;
        let mut rows = self.rows();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut().find(|r| r.id == id).ok_or(RepoError::NotFound)?;
        row.status = status;
        Ok(())
    }
}
