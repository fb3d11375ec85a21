//! Create `post` table (internship postings) with FK to `company_profile`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(uuid(Post::Id).primary_key())
                    .col(uuid(Post::CompanyId).not_null())
                    .col(string_len(Post::Title, 160).not_null())
                    .col(text(Post::Description).not_null())
                    .col(string_len(Post::Field, 64).not_null())
                    .col(string_len(Post::City, 128).not_null())
                    .col(boolean(Post::Paid).not_null())
                    .col(string_len(Post::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Post::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Post::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_company_profile")
                            .from(Post::Table, Post::CompanyId)
                            .to(CompanyProfile::Table, CompanyProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Post::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Post { Table, Id, CompanyId, Title, Description, Field, City, Paid, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum CompanyProfile { Table, Id }
