//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod cache;
mod events;
mod remote;
mod repository;

pub use cache::{CacheError, KeyValueStore};
pub use events::{
    AppEvent, CategoryChange, EventBus, EventHandler, EventKind, SubscriptionId, Topic,
};
pub use remote::{NewsletterReceipt, RemoteFunctions};
pub use repository::{
    BaseRepository, ContactRepository, PostRepository, SubscriberRepository,
};
