//! Command handlers. Each prints a plain-text rendering to stdout.

use std::sync::Arc;

use anyhow::{Context, bail};

use bloghub_core::domain::{
    ContactFilter, ContactForm, ContactStatus, NewPost, Post, PostPatch, PostQuery, ViewMode,
};
use bloghub_core::ports::EventBus;
use bloghub_core::state::AppStateStore;
use bloghub_core::views::PostGridModel;

use crate::state::AppContext;
use crate::{
    CategoriesCommand, Command, ContactCommand, NewsletterCommand, PostsCommand, UpdateArgs,
};

pub async fn run(command: Command, ctx: &AppContext) -> anyhow::Result<()> {
    match command {
        Command::Posts(cmd) => posts(cmd, ctx).await,
        Command::Newsletter(cmd) => newsletter(cmd, ctx).await,
        Command::Categories(cmd) => categories(cmd, ctx).await,
        Command::Contact(cmd) => contact(cmd, ctx).await,
        Command::Like { post_id } => {
            let liked = ctx.engagement.toggle_like(post_id).await?;
            println!("{}", if liked { "liked" } else { "unliked" });
            Ok(())
        }
        Command::Bookmark { post_id } => {
            let saved = ctx.engagement.toggle_bookmark(post_id).await?;
            println!("{}", if saved { "bookmarked" } else { "bookmark removed" });
            Ok(())
        }
        Command::Bookmarks => {
            for id in ctx.engagement.bookmarked_posts().await {
                println!("{id}");
            }
            Ok(())
        }
        Command::Comments { post_id } => {
            for comment in ctx.engagement.comments(post_id).await {
                println!(
                    "[{}] {}: {}",
                    comment.created_at.format("%Y-%m-%d %H:%M"),
                    comment.author,
                    comment.body
                );
            }
            Ok(())
        }
        Command::Comment { post_id, body } => {
            let comment = ctx.engagement.add_comment(post_id, &ctx.author, &body).await?;
            println!("comment {} added", comment.id);
            Ok(())
        }
        Command::Theme { name } => {
            let theme = match name {
                Some(name) => ctx.preferences.set_theme(&name).await?,
                None => ctx.preferences.theme().await,
            };
            println!("{theme}");
            Ok(())
        }
        Command::ViewMode { mode } => {
            let mode = match mode.as_deref() {
                None => ctx.preferences.view_mode().await,
                Some("toggle") => ctx.preferences.toggle_view_mode().await?,
                Some(value) => {
                    let mode: ViewMode = value.parse()?;
                    ctx.preferences.set_view_mode(mode).await?;
                    mode
                }
            };
            println!("{mode}");
            Ok(())
        }
    }
}

fn print_post_line(post: &Post) {
    let marker = if post.is_local() { " (local)" } else { "" };
    println!(
        "{}  {}  [{}]  {}  {}{}",
        post.id,
        post.date.format("%Y-%m-%d"),
        post.category,
        post.read_time,
        post.title,
        marker
    );
}

fn patch_from(fields: UpdateArgs) -> PostPatch {
    PostPatch {
        title: fields.title,
        excerpt: fields.excerpt,
        content: fields.content,
        category: fields.category,
        image_url: fields.image_url,
    }
}

async fn posts(cmd: PostsCommand, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        PostsCommand::List(args) => {
            let query = PostQuery {
                page: args.page,
                limit: args.limit,
                category: args.category,
                search: args.search,
            };
            let fetched = ctx.posts.fetch_posts(&query).await?;
            for post in &fetched.value.posts {
                print_post_line(post);
            }
            let p = fetched.value.pagination;
            println!(
                "page {}/{} ({} posts, served by {})",
                p.page, p.pages, p.total, fetched.tier
            );
        }
        PostsCommand::Browse { page, category } => {
            let listing = ctx
                .posts
                .list_posts(&PostQuery {
                    limit: 100,
                    ..PostQuery::default()
                })
                .await;
            let bus: Arc<dyn EventBus> = ctx.bus.clone();
            let app_state = AppStateStore::load(&ctx.preferences, &ctx.categories, bus.clone()).await?;
            let snapshot = app_state.snapshot();

            let grid = PostGridModel::mount(
                bus,
                listing.posts,
                snapshot.categories,
                snapshot.view_mode,
            );
            if let Some(name) = category {
                if !grid.select_category(&name) {
                    bail!("unknown category: {name}");
                }
            }
            grid.set_page(page);

            println!("[{}]", grid.filters().join("] ["));
            for card in grid.cards() {
                match card.layout {
                    ViewMode::Grid => {
                        println!("▢ {} · {} · {}", card.title, card.category, card.read_time)
                    }
                    ViewMode::List => {
                        println!("- {:<48} {:<16} {}", card.title, card.category, card.read_time)
                    }
                }
            }
            println!(
                "{} | {} | page {}/{}",
                grid.layout(),
                grid.active_category(),
                grid.page(),
                grid.total_pages()
            );
        }
        PostsCommand::Show { id } => {
            let detail = ctx
                .posts
                .get_post(id)
                .await
                .with_context(|| format!("post {id} not found"))?;
            let post = &detail.post;
            println!("{}\n", post.title);
            println!(
                "{} · {} · {} · {}",
                post.author,
                post.category,
                post.date.format("%B %-d, %Y"),
                post.read_time
            );
            println!("\n{}\n", post.content);
            if !detail.related.is_empty() {
                println!("Related:");
                for related in &detail.related {
                    println!("  {}  {}", related.id, related.title);
                }
            }
        }
        PostsCommand::Create(args) => {
            let draft = NewPost {
                title: args.title,
                excerpt: args.excerpt,
                content: args.content,
                category: args.category,
                image_url: args.image_url,
                author: ctx.author.clone(),
                author_avatar: None,
            };
            let created = ctx.posts.create_post(draft).await?;
            print_post_line(&created.value);
            if created.is_fallback() {
                println!("saved by {} after {} failed tier(s)", created.tier, created.failures.len());
            }
        }
        PostsCommand::Update { id, fields } => {
            let post = ctx.posts.update_post(id, patch_from(fields)).await?;
            print_post_line(&post);
        }
        PostsCommand::Delete { id } => {
            ctx.posts.delete_post(id).await?;
            println!("deleted {id}");
        }
        PostsCommand::Local => {
            for post in ctx.posts.local_posts().await {
                print_post_line(&post);
            }
        }
        PostsCommand::Reconcile => {
            let report = ctx.posts.reconcile_local_posts().await?;
            for (local_id, remote_id) in &report.synced {
                println!("{local_id} -> {remote_id}");
            }
            println!("{} synced, {} pending", report.synced.len(), report.pending);
        }
    }
    Ok(())
}

async fn newsletter(cmd: NewsletterCommand, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        NewsletterCommand::Subscribe { email, source } => {
            let subscriber = ctx.newsletter.subscribe(&email, &source).await?;
            println!("subscribed {}", subscriber.email);
        }
        NewsletterCommand::Unsubscribe { email } => {
            ctx.newsletter.unsubscribe(&email).await?;
            println!("unsubscribed {email}");
        }
        NewsletterCommand::List { search } => {
            let subscribers = ctx.newsletter.list(search.as_deref()).await;
            for s in &subscribers {
                println!("{}  {}  {}  {}", s.id, s.date.format("%Y-%m-%d"), s.source, s.email);
            }
            println!("{} subscriber(s)", subscribers.len());
        }
        NewsletterCommand::Delete { id } => {
            ctx.newsletter.delete(id).await?;
            println!("deleted {id}");
        }
        NewsletterCommand::Export { output } => {
            let csv = ctx.newsletter.export_csv().await;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, csv)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("exported to {}", path.display());
                }
                None => print!("{csv}"),
            }
        }
        NewsletterCommand::Send { post_id } => {
            let receipt = ctx.posts.send_newsletter(post_id).await?;
            println!("{} ({} recipient(s))", receipt.message, receipt.recipients.len());
        }
    }
    Ok(())
}

async fn categories(cmd: CategoriesCommand, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        CategoriesCommand::List => {
            for c in ctx.categories.list().await? {
                println!("{:<12} {:<20} {:<20} {}", c.id, c.name, c.slug, c.post_count);
            }
        }
        CategoriesCommand::Add { name } => {
            let category = ctx.categories.add(&name).await?;
            println!("added {} ({})", category.name, category.id);
        }
        CategoriesCommand::Rename { id, name } => {
            let category = ctx.categories.rename(&id, &name).await?;
            println!("renamed {} to {}", category.id, category.name);
        }
        CategoriesCommand::Delete { id } => {
            let category = ctx.categories.delete(&id).await?;
            println!("deleted {}", category.name);
        }
        CategoriesCommand::Sync => {
            let listing = ctx
                .posts
                .list_posts(&PostQuery {
                    limit: 1000,
                    ..PostQuery::default()
                })
                .await;
            for c in ctx.categories.sync_post_counts(&listing.posts).await? {
                println!("{:<20} {}", c.name, c.post_count);
            }
        }
    }
    Ok(())
}

async fn contact(cmd: ContactCommand, ctx: &AppContext) -> anyhow::Result<()> {
    match cmd {
        ContactCommand::Submit {
            first_name,
            last_name,
            email,
            phone,
            message,
        } => {
            let form = ContactForm {
                first_name,
                last_name,
                email,
                phone,
                message,
            };
            let submission = ctx.contact.submit(form).await?;
            println!("received {}", submission.id);
        }
        ContactCommand::List { search, status } => {
            let status = status
                .as_deref()
                .map(str::parse::<ContactStatus>)
                .transpose()?;
            let submissions = ctx.contact.list(&ContactFilter { search, status }).await;
            for s in &submissions {
                println!(
                    "{}  {}  {:<8}  {:<24}  {}",
                    s.id,
                    s.created_at.format("%Y-%m-%d"),
                    s.status,
                    s.full_name(),
                    s.email
                );
            }
        }
        ContactCommand::View { id } => {
            let s = ctx.contact.view(id).await?;
            println!("From: {} <{}>", s.full_name(), s.email);
            if !s.phone.is_empty() {
                println!("Phone: {}", s.phone);
            }
            println!("Status: {}\n\n{}", s.status, s.message);
        }
        ContactCommand::Status { id, status } => {
            let status: ContactStatus = status.parse()?;
            ctx.contact.update_status(id, status).await?;
            println!("{id} marked {status}");
        }
        ContactCommand::Delete { id } => {
            ctx.contact.delete(id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}
