//! Post listing queries and pagination.

use serde::{Deserialize, Serialize};

use super::post::Post;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filters and paging for a post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostQuery {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            category: None,
            search: None,
        }
    }
}

impl PostQuery {
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Page and limit clamped to at least 1.
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.max(1);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit.max(1))
    }

    /// Category is an exact match; search is a case-insensitive substring of
    /// title, excerpt or content.
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if post.category != category {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                [&post.title, &post.excerpt, &post.content]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            None => true,
        }
    }

    /// Filter, order newest first and cut one page out of an in-memory list.
    pub fn apply(&self, posts: Vec<Post>) -> PostPage {
        let query = self.clone().normalized();
        let mut matching: Vec<Post> = posts.into_iter().filter(|p| query.matches(p)).collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));

        let total = matching.len() as u64;
        let posts = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect();

        PostPage {
            posts,
            pagination: Pagination::new(query.page, query.limit, total),
        }
    }
}

/// Pagination metadata accompanying a page of posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(u64::from(limit)),
        }
    }
}

/// One page of posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

impl PostPage {
    /// The degraded result served when every tier failed.
    pub fn empty(query: &PostQuery) -> Self {
        let query = query.clone().normalized();
        Self {
            posts: Vec::new(),
            pagination: Pagination::new(query.page, query.limit, 0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
