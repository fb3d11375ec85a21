//! Create `site_counter` table: named counters backing the stats endpoint.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SiteCounter::Table)
                    .if_not_exists()
                    .col(string_len(SiteCounter::Key, 64).primary_key())
                    .col(big_integer(SiteCounter::Value).not_null())
                    .col(timestamp_with_time_zone(SiteCounter::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SiteCounter::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SiteCounter { Table, Key, Value, UpdatedAt }
