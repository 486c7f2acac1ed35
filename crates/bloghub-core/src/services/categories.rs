//! Category service - the category list lives in the local cache only.

use std::sync::Arc;

use crate::cache::{LocalCache, keys};
use crate::domain::{Category, Post, default_categories};
use crate::error::DomainError;
use crate::ports::{AppEvent, CategoryChange, EventBus};

pub struct CategoryService {
    cache: LocalCache,
    bus: Arc<dyn EventBus>,
}

impl CategoryService {
    pub fn new(cache: LocalCache, bus: Arc<dyn EventBus>) -> Self {
        Self { cache, bus }
    }

    /// Stored categories; the defaults are seeded when none are stored.
    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        let stored: Vec<Category> = self.cache.list(keys::BLOG_CATEGORIES).await?;
        if !stored.is_empty() {
            return Ok(stored);
        }

        let defaults = default_categories();
        self.cache.set_json(keys::BLOG_CATEGORIES, &defaults).await?;
        tracing::debug!(count = defaults.len(), "Seeded default categories");
        Ok(defaults)
    }

    pub async fn names(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.list().await?.into_iter().map(|c| c.name).collect())
    }

    pub async fn add(&self, name: &str) -> Result<Category, DomainError> {
        let name = require_name(name)?;
        let mut categories = self.list().await?;

        if categories.iter().any(|c| c.same_name(name)) {
            return Err(DomainError::Duplicate(
                "A category with this name already exists".to_string(),
            ));
        }

        let category = Category::new(name);
        categories.push(category.clone());
        self.save(categories, CategoryChange::Added {
            name: category.name.clone(),
        })
        .await?;

        tracing::info!(category_id = %category.id, name = %category.name, "Category added");
        Ok(category)
    }

    pub async fn rename(&self, id: &str, new_name: &str) -> Result<Category, DomainError> {
        let new_name = require_name(new_name)?;
        let mut categories = self.list().await?;

        if categories.iter().any(|c| c.id != id && c.same_name(new_name)) {
            return Err(DomainError::Duplicate(
                "A category with this name already exists".to_string(),
            ));
        }

        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("category", id))?;
        let old_name = category.name.clone();
        category.rename(new_name);
        let renamed = category.clone();

        self.save(categories, CategoryChange::Renamed {
            old_name,
            new_name: renamed.name.clone(),
        })
        .await?;

        Ok(renamed)
    }

    /// Delete a category. Refused while posts are still filed under it.
    pub async fn delete(&self, id: &str) -> Result<Category, DomainError> {
        let mut categories = self.list().await?;
        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("category", id))?;

        if categories[index].has_posts() {
            let category = &categories[index];
            return Err(DomainError::Conflict(format!(
                "Cannot delete \"{}\": {} posts still use it",
                category.name, category.post_count
            )));
        }

        let removed = categories.remove(index);
        self.save(categories, CategoryChange::Deleted {
            name: removed.name.clone(),
        })
        .await?;

        tracing::info!(category_id = %removed.id, name = %removed.name, "Category deleted");
        Ok(removed)
    }

    /// Recount `post_count` from a set of posts, matching on category name.
    pub async fn sync_post_counts(&self, posts: &[Post]) -> Result<Vec<Category>, DomainError> {
        let mut categories = self.list().await?;
        for category in &mut categories {
            category.post_count = posts
                .iter()
                .filter(|p| p.category == category.name)
                .count() as u32;
        }
        self.cache.set_json(keys::BLOG_CATEGORIES, &categories).await?;
        self.bus.publish(AppEvent::CategoriesUpdated {
            categories: categories.clone(),
        });
        Ok(categories)
    }

    async fn save(&self, categories: Vec<Category>, change: CategoryChange) -> Result<(), DomainError> {
        self.cache.set_json(keys::BLOG_CATEGORIES, &categories).await?;
        self.bus.publish(AppEvent::CategoriesUpdated { categories });
        self.bus.publish(AppEvent::CategoryFilterUpdate(change));
        Ok(())
    }
}

fn require_name(name: &str) -> Result<&str, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("Category name is required".to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::EventKind;
    use crate::testing::{TestBus, local_cache, post};

    fn service() -> (CategoryService, Arc<TestBus>) {
        let (cache, _) = local_cache();
        let bus = Arc::new(TestBus::default());
        (CategoryService::new(cache, bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_first_list_seeds_defaults() {
        let (service, _) = service();
        let categories = service.list().await.unwrap();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0].name, "Web Development");
    }

    #[tokio::test]
    async fn test_delete_refused_while_posts_remain() {
        let (service, bus) = service();
        // "Web Development" is seeded with two posts.
        let err = service.delete("1").await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(service.list().await.unwrap().len(), 6);
        assert!(bus.published().is_empty());
    }

    #[tokio::test]
    async fn test_delete_empty_category_publishes_events() {
        let (service, bus) = service();
        let removed = service.delete("6").await.unwrap();
        assert_eq!(removed.name, "Architecture");

        let kinds: Vec<EventKind> = bus.published().iter().map(AppEvent::kind).collect();
        assert_eq!(kinds, vec![EventKind::CategoriesUpdated, EventKind::CategoryFilterUpdate]);
        assert_eq!(
            bus.published()[1],
            AppEvent::CategoryFilterUpdate(CategoryChange::Deleted {
                name: "Architecture".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_add_rejects_duplicates_and_blank_names() {
        let (service, _) = service();
        let added = service.add("  Rust Tips ").await.unwrap();
        assert_eq!(added.name, "Rust Tips");
        assert_eq!(added.slug, "rust-tips");

        assert!(matches!(service.add("rust tips").await, Err(DomainError::Duplicate(_))));
        assert!(matches!(service.add("   ").await, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rename_updates_slug_and_announces_old_name() {
        let (service, bus) = service();
        let renamed = service.rename("2", "Tech News").await.unwrap();
        assert_eq!(renamed.slug, "tech-news");

        assert!(bus.published().contains(&AppEvent::CategoryFilterUpdate(
            CategoryChange::Renamed {
                old_name: "Technology".to_string(),
                new_name: "Tech News".to_string(),
            }
        )));
        assert!(matches!(
            service.rename("2", "design").await,
            Err(DomainError::Duplicate(_))
        ));
        assert!(matches!(
            service.rename("missing", "Other").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sync_post_counts() {
        let (service, _) = service();
        let posts = vec![post("A", "Design"), post("B", "Design")];

        let categories = service.sync_post_counts(&posts).await.unwrap();
        let design = categories.iter().find(|c| c.name == "Design").unwrap();
        assert_eq!(design.post_count, 2);
        assert!(service.delete("1").await.is_ok());
    }
}
