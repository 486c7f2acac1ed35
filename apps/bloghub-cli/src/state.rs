//! Application context - adapters wired into the core services.

use std::sync::Arc;

use bloghub_core::cache::LocalCache;
use bloghub_core::fetch::{FallbackPolicy, FetchOrchestrator, Tier};
use bloghub_core::ports::{
    ContactRepository, EventBus, KeyValueStore, PostRepository, RemoteFunctions,
    SubscriberRepository,
};
use bloghub_core::services::{
    CategoryService, ContactService, EngagementService, NewsletterService, PostService,
    PreferencesService,
};
use bloghub_infra::{FileKeyValueStore, InMemoryEventBus, InMemoryKeyValueStore};

use crate::config::{AppConfig, CacheBackend};

/// Services shared by every command.
pub struct AppContext {
    pub bus: Arc<InMemoryEventBus>,
    pub posts: PostService,
    pub categories: CategoryService,
    pub newsletter: NewsletterService,
    pub contact: ContactService,
    pub engagement: EngagementService,
    pub preferences: PreferencesService,
    pub author: String,
}

/// Data-store repositories, present only when the database is reachable.
struct Repositories {
    posts: Arc<dyn PostRepository>,
    subscribers: Arc<dyn SubscriberRepository>,
    contacts: Arc<dyn ContactRepository>,
}

impl AppContext {
    /// Build the context with whichever backends are configured and reachable.
    ///
    /// Tiers that cannot be reached are dropped from the fallback policy.
    pub async fn new(config: &AppConfig) -> Self {
        let cache = LocalCache::new(open_store(config).await);
        let bus = Arc::new(InMemoryEventBus::default());
        let events: Arc<dyn EventBus> = bus.clone();

        let remote = connect_remote(config);
        let repos = connect_store(config).await;

        let mut policy: FallbackPolicy = config.policy.clone();
        if remote.is_none() {
            policy = policy.without(Tier::RemoteFunction);
        }
        if repos.is_none() {
            policy = policy.without(Tier::DataStore);
        }

        let tiers: Vec<&str> = policy.tiers().iter().map(|t| t.tier.as_str()).collect();
        tracing::info!(tiers = ?tiers, "Application context initialized");

        let orchestrator = FetchOrchestrator::new(policy);
        let mut posts = PostService::new(orchestrator.clone(), cache.clone(), events.clone());
        let mut newsletter =
            NewsletterService::new(orchestrator.clone(), cache.clone(), events.clone());
        let mut contact = ContactService::new(orchestrator, cache.clone(), events.clone());

        if let Some(remote) = remote {
            posts = posts.with_remote(remote);
        }
        if let Some(repos) = repos {
            posts = posts.with_store(repos.posts);
            newsletter = newsletter.with_store(repos.subscribers);
            contact = contact.with_store(repos.contacts);
        }

        Self {
            posts,
            newsletter,
            contact,
            categories: CategoryService::new(cache.clone(), events.clone()),
            engagement: EngagementService::new(cache.clone()),
            preferences: PreferencesService::new(cache, events),
            bus,
            author: config.author.clone(),
        }
    }
}

#[cfg(feature = "http")]
fn connect_remote(config: &AppConfig) -> Option<Arc<dyn RemoteFunctions>> {
    let Some(remote_config) = config.remote.clone() else {
        tracing::warn!("BLOGHUB_FUNCTIONS_URL not set. Skipping remote tier.");
        return None;
    };

    match bloghub_infra::HttpRemoteFunctions::new(remote_config) {
        Ok(remote) => Some(Arc::new(remote)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build remote client. Skipping remote tier.");
            None
        }
    }
}

#[cfg(not(feature = "http"))]
fn connect_remote(_config: &AppConfig) -> Option<Arc<dyn RemoteFunctions>> {
    tracing::info!("Running without http feature - remote tier disabled");
    None
}

#[cfg(feature = "postgres")]
async fn connect_store(config: &AppConfig) -> Option<Repositories> {
    let Some(db_config) = &config.database else {
        tracing::warn!("DATABASE_URL not set. Skipping data-store tier.");
        return None;
    };

    match bloghub_infra::DataStore::connect(db_config).await {
        Ok(store) => Some(Repositories {
            posts: store.posts,
            subscribers: store.subscribers,
            contacts: store.contacts,
        }),
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to database. Skipping data-store tier.");
            None
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn connect_store(_config: &AppConfig) -> Option<Repositories> {
    tracing::info!("Running without postgres feature - data-store tier disabled");
    None
}

async fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    match config.cache_backend {
        CacheBackend::Memory => {
            tracing::info!("Using in-memory local cache; nothing persists");
            return Arc::new(InMemoryKeyValueStore::new());
        }
        #[cfg(feature = "redis")]
        CacheBackend::Redis => match bloghub_infra::RedisKeyValueStore::from_env().await {
            Ok(store) => return Arc::new(store),
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to Redis. Using the file cache.");
            }
        },
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => {
            tracing::warn!("Built without redis feature. Using the file cache.");
        }
        CacheBackend::File => {}
    }

    let path = config
        .cache_path
        .clone()
        .or_else(FileKeyValueStore::default_path);

    match path {
        Some(path) => match FileKeyValueStore::open(path).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!(error = %e, "Failed to open local cache file. Using memory.");
                Arc::new(InMemoryKeyValueStore::new())
            }
        },
        None => {
            tracing::warn!("No data directory available. Using memory.");
            Arc::new(InMemoryKeyValueStore::new())
        }
    }
}
