//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_user;
mod m20240301_000002_create_user_credentials;
mod m20240301_000003_create_company_profile;
mod m20240301_000004_create_post;
mod m20240301_000005_create_application;
mod m20240301_000006_create_topic;
mod m20240301_000007_create_message;
mod m20240301_000008_create_report;
mod m20240301_000009_create_site_counter;
mod m20240301_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_user::Migration),
            Box::new(m20240301_000002_create_user_credentials::Migration),
            Box::new(m20240301_000003_create_company_profile::Migration),
            Box::new(m20240301_000004_create_post::Migration),
            Box::new(m20240301_000005_create_application::Migration),
            Box::new(m20240301_000006_create_topic::Migration),
            Box::new(m20240301_000007_create_message::Migration),
            Box::new(m20240301_000008_create_report::Migration),
            Box::new(m20240301_000009_create_site_counter::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000010_add_indexes::Migration),
        ]
    }
}
