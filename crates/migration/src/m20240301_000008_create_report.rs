//! Create `report` table: one user's report of one forum message.
//!
//! No FK to `message`: reports must remain listable after the offending
//! message is removed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(uuid(Report::Id).primary_key())
                    .col(uuid(Report::MessageId).not_null())
                    .col(uuid(Report::ReporterId).not_null())
                    .col(string_len(Report::Reason, 512).not_null())
                    .col(timestamp_with_time_zone(Report::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_reporter")
                            .from(Report::Table, Report::ReporterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Report::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Report { Table, Id, MessageId, ReporterId, Reason, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
