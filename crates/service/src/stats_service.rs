use std::collections::BTreeMap;

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Serialize;
use tracing::instrument;

use models::{application, company_profile, post, report, site_counter, user};

use crate::errors::ServiceError;

/// Live aggregate counts plus the named counters.
#[derive(Debug, Serialize)]
pub struct StatsOverview {
    pub users: u64,
    pub companies: u64,
    pub posts: u64,
    pub applications: u64,
    pub reports: u64,
    pub counters: BTreeMap<String, i64>,
}

/// Bump a named counter (page visits and the like).
#[instrument(skip(db))]
pub async fn record_visit(db: &DatabaseConnection, key: &str) -> Result<i64, ServiceError> {
    let updated = site_counter::increment(db, key).await?;
    Ok(updated.value)
}

pub async fn overview(db: &DatabaseConnection) -> Result<StatsOverview, ServiceError> {
    let users = count(user::Entity::find().count(db)).await?;
    let companies = count(company_profile::Entity::find().count(db)).await?;
    let posts = count(post::Entity::find().count(db)).await?;
    let applications = count(application::Entity::find().count(db)).await?;
    let reports = count(report::Entity::find().count(db)).await?;
    let counters = site_counter::all(db)
        .await?
        .into_iter()
        .map(|c| (c.key, c.value))
        .collect();
    Ok(StatsOverview { users, companies, posts, applications, reports, counters })
}

async fn count(
    fut: impl std::future::Future<Output = Result<u64, sea_orm::DbErr>>,
) -> Result<u64, ServiceError> {
    fut.await.map_err(|e| ServiceError::Db(e.to_string()))
}
