//! Event bus port - typed, in-process publish/subscribe.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Category, ContactStatus, Post, Subscriber, Theme, ViewMode};

/// A change to the category list, as seen by category filter bars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChange {
    Added { name: String },
    Renamed { old_name: String, new_name: String },
    Deleted { name: String },
}

/// Application events carried by the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    ViewModeChanged(ViewMode),
    ThemeChanged(Theme),
    CategoriesUpdated { categories: Vec<Category> },
    CategoryFilterUpdate(CategoryChange),
    PostCreated(Post),
    PostUpdated(Post),
    PostDeleted { id: Uuid },
    PostSynced { local_id: Uuid, post: Post },
    SubscriberAdded(Subscriber),
    SubscriberRemoved { email: String },
    ContactStatusChanged { id: Uuid, status: ContactStatus },
    ContactDeleted { id: Uuid },
}

/// Discriminant used to subscribe to one kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ViewModeChanged,
    ThemeChanged,
    CategoriesUpdated,
    CategoryFilterUpdate,
    PostCreated,
    PostUpdated,
    PostDeleted,
    PostSynced,
    SubscriberAdded,
    SubscriberRemoved,
    ContactStatusChanged,
    ContactDeleted,
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::ViewModeChanged(_) => EventKind::ViewModeChanged,
            AppEvent::ThemeChanged(_) => EventKind::ThemeChanged,
            AppEvent::CategoriesUpdated { .. } => EventKind::CategoriesUpdated,
            AppEvent::CategoryFilterUpdate(_) => EventKind::CategoryFilterUpdate,
            AppEvent::PostCreated(_) => EventKind::PostCreated,
            AppEvent::PostUpdated(_) => EventKind::PostUpdated,
            AppEvent::PostDeleted { .. } => EventKind::PostDeleted,
            AppEvent::PostSynced { .. } => EventKind::PostSynced,
            AppEvent::SubscriberAdded(_) => EventKind::SubscriberAdded,
            AppEvent::SubscriberRemoved { .. } => EventKind::SubscriberRemoved,
            AppEvent::ContactStatusChanged { .. } => EventKind::ContactStatusChanged,
            AppEvent::ContactDeleted { .. } => EventKind::ContactDeleted,
        }
    }
}

/// Which events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    All,
    Kinds(Vec<EventKind>),
}

impl Topic {
    pub fn only(kind: EventKind) -> Self {
        Topic::Kinds(vec![kind])
    }

    pub fn accepts(&self, kind: EventKind) -> bool {
        match self {
            Topic::All => true,
            Topic::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

/// Opaque handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Handler invoked synchronously on the publishing task.
pub type EventHandler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Event bus trait.
///
/// Delivery is synchronous and best-effort: `publish` runs every matching
/// handler before returning, and a handler subscribed after an event was
/// published never sees it.
pub trait EventBus: Send + Sync {
    /// Publish an event; returns the number of handlers that ran.
    fn publish(&self, event: AppEvent) -> usize;

    /// Register a handler for a topic.
    fn subscribe(&self, topic: Topic, handler: EventHandler) -> SubscriptionId;

    /// Remove a subscription. Returns false if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
