//! Contact submission entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use bloghub_core::domain::ContactStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contact_submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for bloghub_core::domain::ContactSubmission {
    fn from(model: Model) -> Self {
        // Unknown statuses written by other clients read as new
        let status = model.status.parse::<ContactStatus>().unwrap_or_default();
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            message: model.message,
            status,
            created_at: model.created_at.into(),
        }
    }
}

impl From<bloghub_core::domain::ContactSubmission> for ActiveModel {
    fn from(submission: bloghub_core::domain::ContactSubmission) -> Self {
        Self {
            id: Set(submission.id),
            first_name: Set(submission.first_name),
            last_name: Set(submission.last_name),
            email: Set(submission.email),
            phone: Set(submission.phone),
            message: Set(submission.message),
            status: Set(submission.status.as_str().to_string()),
            created_at: Set(submission.created_at.into()),
        }
    }
}
