//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use bloghub_core::domain::{
    ContactStatus, ContactSubmission, Pagination, Post, PostPage, PostQuery, PostSummary,
    Subscriber,
};
use bloghub_core::error::RepoError;
use bloghub_core::ports::{ContactRepository, PostRepository, SubscriberRepository};

use super::entity::contact::{self, Entity as ContactEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::subscriber::{self, Entity as SubscriberEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL newsletter subscriber repository.
pub type PostgresSubscriberRepository = PostgresBaseRepository<SubscriberEntity>;

/// PostgreSQL contact submission repository.
pub type PostgresContactRepository = PostgresBaseRepository<ContactEntity>;

fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if local.chars().count() > 1 => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        Some((_, domain)) => format!("***@{domain}"),
        None => "***".to_string(),
    }
}

fn post_filter(query: &PostQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
        condition = condition.add(post::Column::Category.eq(category));
    }

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", term.to_lowercase());
        let mut any = Condition::any();
        for column in [post::Column::Title, post::Column::Excerpt, post::Column::Content] {
            any = any.add(Expr::expr(Func::lower(Expr::col(column))).like(pattern.as_str()));
        }
        condition = condition.add(any);
    }

    condition
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        let query = query.clone().normalized();
        let filter = post_filter(&query);

        let total = PostEntity::find()
            .filter(filter.clone())
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        let rows = PostEntity::find()
            .filter(filter)
            .order_by_desc(post::Column::Date)
            .offset(query.offset())
            .limit(u64::from(query.limit))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(page = query.page, total, "Listed posts from data store");

        Ok(PostPage {
            posts: rows.into_iter().map(Post::from).collect(),
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    async fn related(
        &self,
        category: &str,
        exclude: Uuid,
        limit: u64,
    ) -> Result<Vec<PostSummary>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::Category.eq(category))
            .filter(post::Column::Id.ne(exclude))
            .order_by_desc(post::Column::Date)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(|m| Post::from(m).summary()).collect())
    }
}

#[async_trait]
impl SubscriberRepository for PostgresSubscriberRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, RepoError> {
        // Mask email for logging to avoid PII in logs
        tracing::debug!(email = %mask_email(email), "Finding subscriber by email");

        let result = SubscriberEntity::find()
            .filter(subscriber::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn delete_by_email(&self, email: &str) -> Result<u64, RepoError> {
        let result = SubscriberEntity::delete_many()
            .filter(subscriber::Column::Email.eq(email))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(email = %mask_email(email), removed = result.rows_affected, "Unsubscribed");
        Ok(result.rows_affected)
    }

    async fn list_all(&self) -> Result<Vec<Subscriber>, RepoError> {
        let rows = SubscriberEntity::find()
            .order_by_desc(subscriber::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn list_recent(&self) -> Result<Vec<ContactSubmission>, RepoError> {
        let rows = ContactEntity::find()
            .order_by_desc(contact::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), RepoError> {
        let result = ContactEntity::update_many()
            .col_expr(contact::Column::Status, Expr::value(status.as_str()))
            .filter(contact::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
