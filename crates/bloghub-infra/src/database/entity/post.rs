//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use bloghub_core::domain::RecordOrigin;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub excerpt: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub category: String,
    pub author: String,
    pub author_avatar: Option<String>,
    pub image_url: String,
    pub date: DateTimeWithTimeZone,
    pub read_time: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for bloghub_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            excerpt: model.excerpt,
            content: model.content,
            category: model.category,
            author: model.author,
            author_avatar: model.author_avatar,
            image_url: model.image_url,
            date: model.date.into(),
            read_time: model.read_time,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
            origin: RecordOrigin::Remote,
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<bloghub_core::domain::Post> for ActiveModel {
    fn from(post: bloghub_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            title: Set(post.title),
            excerpt: Set(post.excerpt),
            content: Set(post.content),
            category: Set(post.category),
            author: Set(post.author),
            author_avatar: Set(post.author_avatar),
            image_url: Set(post.image_url),
            date: Set(post.date.into()),
            read_time: Set(post.read_time),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
