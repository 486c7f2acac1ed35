//! Headless view models for the post grid.
//!
//! The grid subscribes to the bus the way a mounted UI component would:
//! layout changes re-render every mounted card, and category edits update
//! the filter tabs.

use std::sync::{Arc, Mutex, Weak};

use uuid::Uuid;

use crate::domain::{Post, ViewMode};
use crate::ports::{
    AppEvent, CategoryChange, EventBus, EventHandler, EventKind, SubscriptionId, Topic,
};
use crate::state::ALL_CATEGORIES;

pub const POSTS_PER_PAGE: usize = 6;

/// One mounted post card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCardModel {
    pub post_id: Uuid,
    pub title: String,
    pub category: String,
    pub read_time: String,
    pub layout: ViewMode,
    /// Times this card has been rendered since it was mounted.
    pub renders: u32,
}

impl PostCardModel {
    fn mount(post: &Post, layout: ViewMode) -> Self {
        Self {
            post_id: post.id,
            title: post.title.clone(),
            category: post.category.clone(),
            read_time: post.read_time.clone(),
            layout,
            renders: 1,
        }
    }

    fn render(&mut self, layout: ViewMode) {
        self.layout = layout;
        self.renders += 1;
    }
}

#[derive(Debug)]
struct Grid {
    posts: Vec<Post>,
    filters: Vec<String>,
    active: String,
    page: usize,
    layout: ViewMode,
    cards: Vec<PostCardModel>,
}

impl Grid {
    fn visible(&self) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| self.active == ALL_CATEGORIES || p.category == self.active)
            .collect()
    }

    fn total_pages(&self) -> usize {
        self.visible().len().div_ceil(POSTS_PER_PAGE)
    }

    /// Unmount the current cards and mount the current page.
    fn remount(&mut self) {
        let start = (self.page - 1) * POSTS_PER_PAGE;
        let cards: Vec<PostCardModel> = self
            .visible()
            .into_iter()
            .skip(start)
            .take(POSTS_PER_PAGE)
            .map(|post| PostCardModel::mount(post, self.layout))
            .collect();
        self.cards = cards;
    }

    fn handle(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ViewModeChanged(layout) => {
                self.layout = *layout;
                for card in &mut self.cards {
                    card.render(*layout);
                }
            }
            AppEvent::CategoryFilterUpdate(change) => self.apply_filter_change(change),
            _ => {}
        }
    }

    fn apply_filter_change(&mut self, change: &CategoryChange) {
        match change {
            CategoryChange::Added { name } => {
                if !self.filters.contains(name) {
                    self.filters.push(name.clone());
                }
            }
            CategoryChange::Renamed { old_name, new_name } => {
                for filter in self.filters.iter_mut() {
                    if *filter == *old_name {
                        *filter = new_name.clone();
                    }
                }
                // Posts carry the label, not a category id.
                for post in self.posts.iter_mut().filter(|p| p.category == *old_name) {
                    post.category = new_name.clone();
                }
                for card in self.cards.iter_mut().filter(|c| c.category == *old_name) {
                    card.category = new_name.clone();
                }
                if self.active == *old_name {
                    self.active = new_name.clone();
                }
            }
            CategoryChange::Deleted { name } => {
                self.filters.retain(|f| f != name);
                if self.active == *name {
                    self.active = ALL_CATEGORIES.to_string();
                    self.page = 1;
                    self.remount();
                }
            }
        }
    }
}

/// The post grid with its filter tabs and pagination.
///
/// Dropping the model unsubscribes it from the bus.
pub struct PostGridModel {
    grid: Arc<Mutex<Grid>>,
    bus: Arc<dyn EventBus>,
    subscription: SubscriptionId,
}

impl PostGridModel {
    /// Mount the grid on page one with the `All` filter active.
    pub fn mount(
        bus: Arc<dyn EventBus>,
        posts: Vec<Post>,
        categories: Vec<String>,
        layout: ViewMode,
    ) -> Self {
        let mut filters = vec![ALL_CATEGORIES.to_string()];
        filters.extend(categories);

        let mut grid = Grid {
            posts,
            filters,
            active: ALL_CATEGORIES.to_string(),
            page: 1,
            layout,
            cards: Vec::new(),
        };
        grid.remount();

        let grid = Arc::new(Mutex::new(grid));
        let subscription = bus.subscribe(
            Topic::Kinds(vec![EventKind::ViewModeChanged, EventKind::CategoryFilterUpdate]),
            grid_handler(Arc::downgrade(&grid)),
        );
        tracing::trace!(subscription = %subscription, "Post grid mounted");

        Self {
            grid,
            bus,
            subscription,
        }
    }

    pub fn cards(&self) -> Vec<PostCardModel> {
        self.lock().cards.clone()
    }

    pub fn layout(&self) -> ViewMode {
        self.lock().layout
    }

    /// Filter tab labels, `All` first.
    pub fn filters(&self) -> Vec<String> {
        self.lock().filters.clone()
    }

    pub fn active_category(&self) -> String {
        self.lock().active.clone()
    }

    pub fn page(&self) -> usize {
        self.lock().page
    }

    pub fn total_pages(&self) -> usize {
        self.lock().total_pages()
    }

    /// Switch filter tab and go back to page one. Unknown tabs are ignored.
    pub fn select_category(&self, name: &str) -> bool {
        let mut grid = self.lock();
        if !grid.filters.iter().any(|f| f == name) {
            return false;
        }
        grid.active = name.to_string();
        grid.page = 1;
        grid.remount();
        true
    }

    /// Go to a page, clamped to the available range.
    pub fn set_page(&self, page: usize) -> usize {
        let mut grid = self.lock();
        let pages = grid.total_pages().max(1);
        grid.page = page.clamp(1, pages);
        grid.remount();
        grid.page
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Grid> {
        self.grid.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for PostGridModel {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

fn grid_handler(grid: Weak<Mutex<Grid>>) -> EventHandler {
    Arc::new(move |event: &AppEvent| {
        if let Some(grid) = grid.upgrade() {
            grid.lock().unwrap_or_else(|e| e.into_inner()).handle(event);
        }
    })
}
