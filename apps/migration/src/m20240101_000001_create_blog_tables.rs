use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Title).string().not_null())
                    .col(ColumnDef::new(Posts::Excerpt).text().not_null())
                    .col(ColumnDef::new(Posts::Content).text().not_null())
                    .col(ColumnDef::new(Posts::Category).string().not_null())
                    .col(ColumnDef::new(Posts::Author).string().not_null())
                    .col(ColumnDef::new(Posts::AuthorAvatar).string().null())
                    .col(ColumnDef::new(Posts::ImageUrl).string().not_null())
                    .col(
                        ColumnDef::new(Posts::Date)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Posts::ReadTime).string().not_null())
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_category_date")
                    .table(Posts::Table)
                    .col(Posts::Category)
                    .col(Posts::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(NewsletterSubscribers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(NewsletterSubscribers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(NewsletterSubscribers::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(NewsletterSubscribers::Source)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(NewsletterSubscribers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactSubmissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContactSubmissions::FirstName).string().not_null())
                    .col(ColumnDef::new(ContactSubmissions::LastName).string().not_null())
                    .col(ColumnDef::new(ContactSubmissions::Email).string().not_null())
                    .col(
                        ColumnDef::new(ContactSubmissions::Phone)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(ContactSubmissions::Message).text().not_null())
                    .col(
                        ColumnDef::new(ContactSubmissions::Status)
                            .string()
                            .not_null()
                            .default("new"),
                    )
                    .col(
                        ColumnDef::new(ContactSubmissions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactSubmissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(NewsletterSubscribers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Excerpt,
    Content,
    Category,
    Author,
    AuthorAvatar,
    ImageUrl,
    Date,
    ReadTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum NewsletterSubscribers {
    Table,
    Id,
    Email,
    Source,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ContactSubmissions {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    Message,
    Status,
    CreatedAt,
}
