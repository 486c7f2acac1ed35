//! # BlogHub Console
//!
//! Command-line entry point for the BlogHub data layer: posts through the
//! remote/data-store/local-cache chain, newsletter, categories, the contact
//! inbox and reader preferences.

use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

mod commands;
mod config;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppContext;
use telemetry::TelemetryConfig;

#[derive(Debug, Parser)]
#[command(name = "bloghub", version, about = "BlogHub console")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Blog posts
    #[command(subcommand)]
    Posts(PostsCommand),
    /// Newsletter subscribers and sends
    #[command(subcommand)]
    Newsletter(NewsletterCommand),
    /// Post categories
    #[command(subcommand)]
    Categories(CategoriesCommand),
    /// Contact form inbox
    #[command(subcommand)]
    Contact(ContactCommand),
    /// Toggle the like on a post
    Like { post_id: Uuid },
    /// Toggle the bookmark on a post
    Bookmark { post_id: Uuid },
    /// List bookmarked post ids
    Bookmarks,
    /// Show the comments on a post
    Comments { post_id: Uuid },
    /// Add a comment to a post
    Comment { post_id: Uuid, body: String },
    /// Show or set the theme
    Theme { name: Option<String> },
    /// Show or set the listing layout (`grid`, `list` or `toggle`)
    ViewMode { mode: Option<String> },
}

#[derive(Debug, Subcommand)]
enum PostsCommand {
    /// List posts
    List(ListArgs),
    /// Render the post grid as cards in the saved layout
    Browse {
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one post with related posts
    Show { id: Uuid },
    /// Create a post
    Create(CreateArgs),
    /// Update fields of a post
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete a post
    Delete { id: Uuid },
    /// Posts created while no backend was reachable
    Local,
    /// Replay offline posts to the backend
    Reconcile,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 10)]
    limit: u32,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    search: Option<String>,
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    excerpt: String,
    #[arg(long)]
    content: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    image_url: String,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    excerpt: Option<String>,
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum NewsletterCommand {
    Subscribe {
        email: String,
        #[arg(long, default_value = "cli")]
        source: String,
    },
    Unsubscribe {
        email: String,
    },
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Delete {
        id: Uuid,
    },
    /// Write subscribers as CSV to stdout or a file
    Export {
        #[arg(long)]
        output: Option<std::path::PathBuf>,
    },
    /// Email a post to every subscriber
    Send {
        post_id: Uuid,
    },
}

#[derive(Debug, Subcommand)]
enum CategoriesCommand {
    List,
    Add { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
    /// Recount posts per category from the current post list
    Sync,
}

#[derive(Debug, Subcommand)]
enum ContactCommand {
    Submit {
        #[arg(long)]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        message: String,
    },
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Show a submission and mark it read
    View { id: Uuid },
    Status { id: Uuid, status: String },
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::from_env();

    // Build application context
    let ctx = AppContext::new(&config).await;

    commands::run(cli.command, &ctx).await
}
