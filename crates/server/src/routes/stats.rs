use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use service::stats_service::{self, StatsOverview};

use crate::errors::{from_service_error, JsonApiError};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct RecordVisitInput {
    /// Counter key, defaults to site-wide visits.
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordVisitOutput {
    pub key: String,
    pub value: i64,
}

/// Anonymous endpoint; whitelisted in the auth middleware. The body is
/// optional, a bare POST bumps the site-wide counter.
#[utoipa::path(post, path = "/api/stats/visit", tag = "stats", request_body = crate::openapi::RecordVisitInputDoc, responses((status = 200, description = "Counter value")))]
pub async fn record_visit(
    State(state): State<ServerState>,
    body: Option<Json<RecordVisitInput>>,
) -> Result<Json<RecordVisitOutput>, JsonApiError> {
    let key = body
        .and_then(|Json(input)| input.key)
        .unwrap_or_else(|| "visits".to_string());
    let value = stats_service::record_visit(&state.db, &key)
        .await
        .map_err(from_service_error)?;
    Ok(Json(RecordVisitOutput { key, value }))
}

#[utoipa::path(get, path = "/api/stats", tag = "stats", responses((status = 200, description = "Aggregate counts")))]
pub async fn overview(State(state): State<ServerState>) -> Result<Json<StatsOverview>, JsonApiError> {
    let stats = stats_service::overview(&state.db)
        .await
        .map_err(from_service_error)?;
    Ok(Json(stats))
}
