//! Well-known local cache keys.

use uuid::Uuid;

pub const NEWSLETTER_SUBSCRIBERS: &str = "newsletter_subscribers";
pub const CONTACT_SUBMISSIONS: &str = "contact_submissions";
pub const BLOG_CATEGORIES: &str = "blog_categories";
pub const THEME: &str = "theme";
pub const VIEW_MODE: &str = "view_mode";
pub const LIKED_POSTS: &str = "liked_posts";
pub const BOOKMARKED_POSTS: &str = "bookmarked_posts";
/// Posts last served by a backend tier, kept for offline reads.
pub const POSTS_CACHE: &str = "posts_cache";
/// Posts synthesized on this device, waiting to be reconciled.
pub const LOCAL_POSTS: &str = "local_posts";

/// Per-post comment list.
pub fn comments(post_id: Uuid) -> String {
    format!("comments_{post_id}")
}
