use axum::{
    middleware,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

pub mod applications;
pub mod auth;
pub mod companies;
pub mod forum;
pub mod posts;
pub mod reports;
pub mod stats;
pub mod uploads;

pub use auth::{ServerAuthConfig, ServerState};

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service healthy", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router. Everything under `/api` except the
/// whitelist inside `require_bearer_token_state` requires a valid token.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()));

    let api = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/companies", get(companies::list).post(companies::create))
        .route("/api/companies/:id", get(companies::get).put(companies::update))
        .route("/api/posts", get(posts::list).post(posts::create))
        .route("/api/posts/:id", get(posts::get).put(posts::update).delete(posts::delete))
        .route("/api/applications", get(applications::list).post(applications::create))
        .route("/api/applications/:id", get(applications::get))
        .route("/api/applications/:id/status", patch(applications::decide))
        .route("/api/forum/topics", get(forum::list_topics).post(forum::create_topic))
        .route("/api/forum/topics/:id", get(forum::get_topic))
        .route(
            "/api/forum/topics/:id/messages",
            get(forum::list_messages).post(forum::post_message),
        )
        .route("/api/reports", get(reports::list).post(reports::create))
        .route("/api/reports/message/:message_id", get(reports::list_for_message))
        .route("/api/stats/visit", post(stats::record_visit))
        .route("/api/stats", get(stats::overview))
        .route("/api/uploads/presign", post(uploads::presign))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token_state,
        ));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
