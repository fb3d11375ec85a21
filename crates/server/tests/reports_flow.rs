use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::json;
use tower::Service;
use uuid::Uuid;

use server::routes::{self, ServerAuthConfig, ServerState};
use service::mailer::{mock::MockMailProvider, Mailer};
use service::uploads::presign::Presigner;

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let provider = Arc::new(MockMailProvider::default());
    let mailer = Arc::new(Mailer::new(provider, configs::MailerConfig::default()));
    let presigner = Arc::new(Presigner::new(configs::StorageConfig::default()));
    let state = ServerState {
        db,
        auth: ServerAuthConfig { jwt_secret: "test-secret".into() },
        mailer,
        presigner,
    };
    Ok(routes::build_router(state, cors()))
}

async fn json_body(resp: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Register a fresh user with the given role and return a bearer token.
async fn signup(app: &Router, role: &str) -> anyhow::Result<String> {
    let email = format!("user_{}@example.com", Uuid::new_v4());
    let password = "StrongPass123";

    let req = Request::builder().method("POST").uri("/api/auth/register").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "email": email, "name": "Tester", "password": password, "role": role
        }))?))?;
    let resp = app.clone().call(req).await?;
    anyhow::ensure!(resp.status() == StatusCode::OK, "register failed: {}", resp.status());

    let req = Request::builder().method("POST").uri("/api/auth/login").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "email": email, "password": password
        }))?))?;
    let resp = app.clone().call(req).await?;
    anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());
    let body = json_body(resp).await?;
    Ok(body["token"].as_str().expect("token").to_string())
}

async fn post_json(app: &Router, token: &str, uri: &str, body: serde_json::Value) -> anyhow::Result<axum::response::Response> {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body)?))?;
    Ok(app.clone().call(req).await?)
}

async fn get_with(app: &Router, token: &str, uri: &str) -> anyhow::Result<axum::response::Response> {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    Ok(app.clone().call(req).await?)
}

#[tokio::test]
async fn report_lifecycle_over_http() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    let author = signup(&app, "student").await?;
    let reporter = signup(&app, "student").await?;
    let admin = signup(&app, "admin").await?;

    // Author opens a thread and posts something reportable.
    let resp = post_json(&app, &author, "/api/forum/topics", json!({"title": "General"})).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let topic = json_body(resp).await?;
    let topic_id = topic["id"].as_str().expect("topic id").to_string();

    let resp = post_json(
        &app,
        &author,
        &format!("/api/forum/topics/{topic_id}/messages"),
        json!({"body": "definitely spam"}),
    )
    .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let message = json_body(resp).await?;
    let message_id = message["id"].as_str().expect("message id").to_string();

    // First report goes through.
    let resp = post_json(&app, &reporter, "/api/reports", json!({
        "message_id": message_id, "reason": "spam"
    })).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same reporter, same message: conflict.
    let resp = post_json(&app, &reporter, "/api/reports", json!({
        "message_id": message_id, "reason": "spam again"
    })).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Unknown message: not found.
    let resp = post_json(&app, &reporter, "/api/reports", json!({
        "message_id": Uuid::new_v4(), "reason": "spam"
    })).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Malformed id in the body fails before any lookup.
    let resp = post_json(&app, &reporter, "/api/reports", json!({
        "message_id": "not-a-uuid", "reason": "spam"
    })).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Malformed id in the path fails before any lookup.
    let resp = get_with(&app, &admin, "/api/reports/message/not-a-uuid").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Admin sees the report on the message.
    let resp = get_with(&app, &admin, &format!("/api/reports/message/{message_id}")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = json_body(resp).await?;
    assert_eq!(listed.as_array().expect("array").len(), 1);

    // Admin listing works; non-admin is rejected.
    let resp = get_with(&app, &admin, "/api/reports?page=1&limit=10").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = get_with(&app, &reporter, "/api/reports").await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn reports_require_authentication() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/api/reports")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "message_id": Uuid::new_v4(), "reason": "spam"
        }))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
