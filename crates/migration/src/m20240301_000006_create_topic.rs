//! Create `topic` table (forum threads) with FK to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Topic::Table)
                    .if_not_exists()
                    .col(uuid(Topic::Id).primary_key())
                    .col(uuid(Topic::AuthorId).not_null())
                    .col(string_len(Topic::Title, 160).not_null())
                    .col(timestamp_with_time_zone(Topic::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_topic_author")
                            .from(Topic::Table, Topic::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Topic::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Topic { Table, Id, AuthorId, Title, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
