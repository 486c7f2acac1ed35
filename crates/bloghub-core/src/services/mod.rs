//! Application services - the operations the UI and console call.
//!
//! Each service receives its ports by injection; none of them hold global state.

mod categories;
mod contact;
mod engagement;
mod newsletter;
mod posts;
mod preferences;

pub use categories::CategoryService;
pub use contact::ContactService;
pub use engagement::EngagementService;
pub use newsletter::NewsletterService;
pub use posts::{PostService, ReconcileReport};
pub use preferences::PreferencesService;
