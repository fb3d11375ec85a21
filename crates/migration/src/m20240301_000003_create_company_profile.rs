//! Create `company_profile` table with FK to `user`.
//!
//! One profile per company account; coordinates feed the client map.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CompanyProfile::Table)
                    .if_not_exists()
                    .col(uuid(CompanyProfile::Id).primary_key())
                    .col(uuid(CompanyProfile::UserId).unique_key().not_null())
                    .col(string_len(CompanyProfile::Name, 128).not_null())
                    .col(text(CompanyProfile::Description).not_null())
                    .col(ColumnDef::new(CompanyProfile::Website).string_len(255).null())
                    .col(string_len(CompanyProfile::City, 128).not_null())
                    .col(ColumnDef::new(CompanyProfile::Address).string_len(255).null())
                    .col(ColumnDef::new(CompanyProfile::Latitude).double().null())
                    .col(ColumnDef::new(CompanyProfile::Longitude).double().null())
                    .col(timestamp_with_time_zone(CompanyProfile::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(CompanyProfile::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_company_profile_user")
                            .from(CompanyProfile::Table, CompanyProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CompanyProfile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum CompanyProfile {
    Table, Id, UserId, Name, Description, Website, City, Address,
    Latitude, Longitude, CreatedAt, UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
