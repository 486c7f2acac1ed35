//! Domain entities - the core business objects.

mod category;
mod comment;
mod contact;
mod post;
mod preferences;
mod query;
mod subscriber;

pub use category::{Category, default_categories, slugify};
pub use comment::Comment;
pub use contact::{ContactFilter, ContactForm, ContactStatus, ContactSubmission};
pub use post::{
    NewPost, Post, PostDetail, PostPatch, PostSummary, RecordOrigin, WORDS_PER_MINUTE,
    estimate_read_time, format_read_time,
};
pub use preferences::{THEMES, Theme, ViewMode};
pub use query::{DEFAULT_PAGE_SIZE, Pagination, PostPage, PostQuery};
pub use subscriber::{Subscriber, normalize_email};
