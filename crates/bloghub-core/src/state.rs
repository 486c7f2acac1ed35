//! Application state store, kept in sync through the event bus.

use std::sync::{Arc, RwLock};

use crate::domain::{Theme, ViewMode};
use crate::error::DomainError;
use crate::ports::{AppEvent, CategoryChange, EventBus, EventKind, SubscriptionId, Topic};
use crate::services::{CategoryService, PreferencesService};

/// Label of the filter tab that shows every category.
pub const ALL_CATEGORIES: &str = "All";

/// Snapshot of UI state shared across unrelated components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view_mode: ViewMode,
    pub theme: Theme,
    pub categories: Vec<String>,
    pub active_category: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::default(),
            theme: Theme::default(),
            categories: Vec::new(),
            active_category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl AppState {
    /// Fold one event into the state.
    pub fn apply(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ViewModeChanged(mode) => self.view_mode = *mode,
            AppEvent::ThemeChanged(theme) => self.theme = theme.clone(),
            // The active filter is moved by the CategoryFilterUpdate that follows.
            AppEvent::CategoriesUpdated { categories } => {
                self.categories = categories.iter().map(|c| c.name.clone()).collect();
            }
            AppEvent::CategoryFilterUpdate(change) => self.apply_category_change(change),
            _ => {}
        }
    }

    fn apply_category_change(&mut self, change: &CategoryChange) {
        match change {
            CategoryChange::Added { name } => {
                if !self.categories.contains(name) {
                    self.categories.push(name.clone());
                }
            }
            CategoryChange::Renamed { old_name, new_name } => {
                for name in self.categories.iter_mut() {
                    if *name == *old_name {
                        *name = new_name.clone();
                    }
                }
                if &self.active_category == old_name {
                    self.active_category = new_name.clone();
                }
            }
            CategoryChange::Deleted { name } => {
                self.categories.retain(|n| n != name);
                if &self.active_category == name {
                    self.active_category = ALL_CATEGORIES.to_string();
                }
            }
        }
    }

    fn has_category(&self, name: &str) -> bool {
        name == ALL_CATEGORIES || self.categories.iter().any(|c| c == name)
    }
}

/// Owns an [`AppState`] and keeps it current from bus events.
///
/// Dropping the store removes its subscription.
pub struct AppStateStore {
    state: Arc<RwLock<AppState>>,
    bus: Arc<dyn EventBus>,
    subscription: SubscriptionId,
}

impl AppStateStore {
    /// Subscribe with an explicit starting state.
    pub fn new(initial: AppState, bus: Arc<dyn EventBus>) -> Self {
        let state = Arc::new(RwLock::new(initial));
        let handler_state = Arc::downgrade(&state);

        let subscription = bus.subscribe(
            Topic::Kinds(vec![
                EventKind::ViewModeChanged,
                EventKind::ThemeChanged,
                EventKind::CategoriesUpdated,
                EventKind::CategoryFilterUpdate,
            ]),
            Arc::new(move |event: &AppEvent| {
                if let Some(state) = handler_state.upgrade() {
                    let mut state = state.write().unwrap_or_else(|e| e.into_inner());
                    state.apply(event);
                }
            }),
        );

        Self {
            state,
            bus,
            subscription,
        }
    }

    /// Build from the persisted preferences and category list.
    pub async fn load(
        preferences: &PreferencesService,
        categories: &CategoryService,
        bus: Arc<dyn EventBus>,
    ) -> Result<Self, DomainError> {
        let initial = AppState {
            view_mode: preferences.view_mode().await,
            theme: preferences.theme().await,
            categories: categories.names().await?,
            active_category: ALL_CATEGORIES.to_string(),
        };
        Ok(Self::new(initial, bus))
    }

    pub fn snapshot(&self) -> AppState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Select a filter tab. Unknown names are ignored.
    pub fn select_category(&self, name: &str) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if !state.has_category(name) {
            return false;
        }
        state.active_category = name.to_string();
        true
    }
}

impl Drop for AppStateStore {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestBus, local_cache};

    async fn store() -> (AppStateStore, CategoryService, PreferencesService, Arc<TestBus>) {
        let (cache, _) = local_cache();
        let bus = Arc::new(TestBus::default());
        let categories = CategoryService::new(cache.clone(), bus.clone());
        let preferences = PreferencesService::new(cache, bus.clone());
        let store = AppStateStore::load(&preferences, &categories, bus.clone())
            .await
            .unwrap();
        (store, categories, preferences, bus)
    }

    #[tokio::test]
    async fn test_load_reads_persisted_state() {
        let (store, ..) = store().await;
        let state = store.snapshot();

        assert_eq!(state.view_mode, ViewMode::Grid);
        assert_eq!(state.categories.len(), 6);
        assert_eq!(state.active_category, ALL_CATEGORIES);
    }

    #[tokio::test]
    async fn test_follows_preference_changes() {
        let (store, _, preferences, _) = store().await;

        preferences.set_view_mode(ViewMode::List).await.unwrap();
        preferences.set_theme("night").await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.view_mode, ViewMode::List);
        assert_eq!(state.theme.as_str(), "night");
    }

    #[tokio::test]
    async fn test_active_filter_follows_rename_and_resets_on_delete() {
        let (store, categories, ..) = store().await;
        assert!(store.select_category("Architecture"));

        categories.rename("6", "Systems").await.unwrap();
        assert_eq!(store.snapshot().active_category, "Systems");

        categories.delete("6").await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.active_category, ALL_CATEGORIES);
        assert!(!state.categories.contains(&"Systems".to_string()));
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let (store, _, _, bus) = store().await;
        assert_eq!(bus.subscriber_count(), 1);
        drop(store);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_select_unknown_category_is_ignored() {
        let store = AppStateStore::new(AppState::default(), Arc::new(TestBus::default()));
        assert!(!store.select_category("Gardening"));
        assert!(store.select_category(ALL_CATEGORIES));
    }
}
