//! In-memory event bus implementation.
//!
//! Works within a single process only. Handlers run synchronously on the
//! publishing task; `watch` additionally mirrors every event onto a
//! broadcast channel for async consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tokio::sync::broadcast;

use bloghub_core::ports::{AppEvent, EventBus, EventHandler, SubscriptionId, Topic};

struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    handler: EventHandler,
}

/// In-memory event bus.
pub struct InMemoryEventBus {
    subscriptions: RwLock<Vec<Subscription>>,
    next_id: AtomicU64,
    mirror: broadcast::Sender<AppEvent>,
}

impl InMemoryEventBus {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            subscriptions: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            mirror: broadcast::channel(buffer_size.max(1)).0,
        }
    }

    /// Receive every event published from now on.
    ///
    /// Slow receivers lose the oldest events (`RecvError::Lagged`).
    pub fn watch(&self) -> broadcast::Receiver<AppEvent> {
        self.mirror.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EventBus for InMemoryEventBus {
    fn publish(&self, event: AppEvent) -> usize {
        let kind = event.kind();

        // Snapshot first so handlers may subscribe or unsubscribe re-entrantly
        let handlers: Vec<EventHandler> = self
            .subscriptions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|s| s.topic.accepts(kind))
            .map(|s| s.handler.clone())
            .collect();

        for handler in &handlers {
            handler(&event);
        }

        // Ignore send errors (no watchers)
        let _ = self.mirror.send(event);
        tracing::debug!(kind = ?kind, handlers = handlers.len(), "Event published");

        handlers.len()
    }

    fn subscribe(&self, topic: Topic, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(subscription = %id, topic = ?topic, "Subscribed");

        self.subscriptions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Subscription { id, topic, handler });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write().unwrap_or_else(|e| e.into_inner());
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);

        let removed = subscriptions.len() != before;
        if removed {
            tracing::debug!(subscription = %id, "Unsubscribed");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use super::*;
    use bloghub_core::domain::{NewPost, Post, RecordOrigin, ViewMode};
    use bloghub_core::ports::{CategoryChange, EventKind};
    use bloghub_core::views::PostGridModel;

    fn post(title: &str, category: &str) -> Post {
        NewPost {
            title: title.to_string(),
            excerpt: "excerpt".to_string(),
            content: "body".to_string(),
            category: category.to_string(),
            image_url: "https://example.com/i.jpg".to_string(),
            author: "Admin".to_string(),
            author_avatar: None,
        }
        .into_post(RecordOrigin::Remote)
    }

    fn counter(count: &Arc<AtomicUsize>) -> EventHandler {
        let count = count.clone();
        Arc::new(move |_event: &AppEvent| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_publish_reaches_matching_topics_only() {
        let bus = InMemoryEventBus::default();
        let views = Arc::new(AtomicUsize::new(0));
        let everything = Arc::new(AtomicUsize::new(0));

        bus.subscribe(Topic::only(EventKind::ViewModeChanged), counter(&views));
        bus.subscribe(Topic::All, counter(&everything));

        assert_eq!(bus.publish(AppEvent::ViewModeChanged(ViewMode::List)), 2);
        assert_eq!(bus.publish(AppEvent::PostDeleted { id: uuid::Uuid::new_v4() }), 1);

        assert_eq!(views.load(Ordering::SeqCst), 1);
        assert_eq!(everything.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = InMemoryEventBus::default();
        let count = Arc::new(AtomicUsize::new(0));
        let id = bus.subscribe(Topic::All, counter(&count));

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.publish(AppEvent::ViewModeChanged(ViewMode::Grid)), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let bus = InMemoryEventBus::default();
        bus.publish(AppEvent::ViewModeChanged(ViewMode::List));

        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(Topic::All, counter(&count));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_watch_mirrors_events() {
        let bus = InMemoryEventBus::default();
        let mut rx = bus.watch();

        bus.publish(AppEvent::CategoryFilterUpdate(CategoryChange::Added {
            name: "Rust".to_string(),
        }));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), EventKind::CategoryFilterUpdate);
    }

    #[test]
    fn test_view_mode_change_re_renders_mounted_grid() {
        let bus: Arc<InMemoryEventBus> = Arc::new(InMemoryEventBus::default());
        let posts = vec![post("One", "Technology"), post("Two", "Design")];

        let grid = PostGridModel::mount(
            bus.clone(),
            posts,
            vec!["Technology".to_string(), "Design".to_string()],
            ViewMode::Grid,
        );
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(AppEvent::ViewModeChanged(ViewMode::List));

        assert_eq!(grid.layout(), ViewMode::List);
        assert!(grid.cards().iter().all(|c| c.layout == ViewMode::List && c.renders == 2));

        drop(grid);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
