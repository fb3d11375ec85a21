//! Indexes for the hot query paths, plus the duplicate-guard unique indexes
//! on (post, student) applications and (message, reporter) reports.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_post_company_status")
                    .table(Post::Table)
                    .col(Post::CompanyId)
                    .col(Post::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_application_post_student")
                    .table(Application::Table)
                    .col(Application::PostId)
                    .col(Application::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_message_topic")
                    .table(Message::Table)
                    .col(Message::TopicId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uq_report_message_reporter")
                    .table(Report::Table)
                    .col(Report::MessageId)
                    .col(Report::ReporterId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uq_report_message_reporter").table(Report::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_message_topic").table(Message::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uq_application_post_student").table(Application::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_post_company_status").table(Post::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Post { Table, CompanyId, Status }

#[derive(DeriveIden)]
enum Application { Table, PostId, StudentId }

#[derive(DeriveIden)]
enum Message { Table, TopicId }

#[derive(DeriveIden)]
enum Report { Table, MessageId, ReporterId }
