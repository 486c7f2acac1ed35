//! Newsletter subscriber entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "newsletter_subscribers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub source: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for bloghub_core::domain::Subscriber {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            source: model.source,
            date: model.created_at.into(),
        }
    }
}

impl From<bloghub_core::domain::Subscriber> for ActiveModel {
    fn from(subscriber: bloghub_core::domain::Subscriber) -> Self {
        Self {
            id: Set(subscriber.id),
            email: Set(subscriber.email),
            source: Set(subscriber.source),
            created_at: Set(subscriber.date.into()),
        }
    }
}
