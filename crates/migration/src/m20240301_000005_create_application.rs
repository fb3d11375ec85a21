//! Create `application` table: a student's application to one post.
//! Uniqueness of (post, student) is enforced by an index applied last.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Application::Table)
                    .if_not_exists()
                    .col(uuid(Application::Id).primary_key())
                    .col(uuid(Application::PostId).not_null())
                    .col(uuid(Application::StudentId).not_null())
                    .col(text(Application::CoverLetter).not_null())
                    .col(ColumnDef::new(Application::CvKey).string_len(255).null())
                    .col(string_len(Application::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Application::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Application::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_post")
                            .from(Application::Table, Application::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_student")
                            .from(Application::Table, Application::StudentId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Application::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Application { Table, Id, PostId, StudentId, CoverLetter, CvKey, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Post { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
