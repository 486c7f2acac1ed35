use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category entity - a named label posts are filed under.
///
/// There is no foreign key to posts: a post belongs to a category when its
/// `category` string equals the category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Denormalized count, maintained by whoever writes the list.
    pub post_count: u32,
}

impl Category {
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            slug: slugify(name),
            post_count: 0,
        }
    }

    /// Rename, re-deriving the slug.
    pub fn rename(&mut self, name: &str) {
        self.name = name.trim().to_string();
        self.slug = slugify(&self.name);
    }

    pub fn has_posts(&self) -> bool {
        self.post_count > 0
    }

    pub fn same_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.trim().to_lowercase()
    }
}

/// Derive a URL slug from a category name.
///
/// Lowercases, drops everything except word characters, whitespace and `-`,
/// collapses runs of whitespace, `_` and `-` into one `-`, and trims dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_dash = true;
        }
    }

    slug
}

/// Categories seeded the first time the list is read.
pub fn default_categories() -> Vec<Category> {
    [
        ("1", "Web Development", 2),
        ("2", "Technology", 1),
        ("3", "Design", 1),
        ("4", "UX Design", 1),
        ("5", "Backend", 1),
        ("6", "Architecture", 0),
    ]
    .into_iter()
    .map(|(id, name, post_count)| Category {
        id: id.to_string(),
        name: name.to_string(),
        slug: slugify(name),
        post_count,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Web Development"), "web-development");
        assert_eq!(slugify("  UX & Design!! "), "ux-design");
        assert_eq!(slugify("snake_case--name"), "snake-case-name");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_default_categories() {
        let defaults = default_categories();
        assert_eq!(defaults.len(), 6);
        assert_eq!(defaults[3].slug, "ux-design");
        assert!(!defaults[5].has_posts());
    }

    #[test]
    fn test_serializes_post_count_in_camel_case() {
        let json = serde_json::to_value(Category::new("Travel")).unwrap();
        assert_eq!(json["postCount"], 0);
        assert_eq!(json["slug"], "travel");
    }
}
