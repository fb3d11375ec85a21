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

fn storage() -> configs::StorageConfig {
    configs::StorageConfig {
        endpoint: "http://minio.local:9000".into(),
        access_key_id: "test-access".into(),
        secret_access_key: "test-secret".into(),
        ..configs::StorageConfig::default()
    }
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
    let presigner = Arc::new(Presigner::new(storage()));
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

async fn send_json(
    app: &Router,
    method: &str,
    token: &str,
    uri: &str,
    body: serde_json::Value,
) -> anyhow::Result<axum::response::Response> {
    let req = Request::builder()
        .method(method)
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
async fn company_post_application_lifecycle() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    let company = signup(&app, "company").await?;
    let student = signup(&app, "student").await?;

    // Posting before a profile exists is rejected.
    let resp = send_json(&app, "POST", &company, "/api/posts", json!({
        "title": "Backend intern", "description": "Rust work", "field": "software", "city": "Ghent", "paid": true
    })).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let profile_body = json!({
        "name": format!("Acme {}", Uuid::new_v4()),
        "description": "We make everything",
        "website": "https://acme.example",
        "city": "Ghent",
        "latitude": 51.05,
        "longitude": 3.72
    });
    let resp = send_json(&app, "POST", &company, "/api/companies", profile_body.clone()).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let profile = json_body(resp).await?;
    let profile_id = profile["id"].as_str().expect("profile id").to_string();

    // One profile per user.
    let resp = send_json(&app, "POST", &company, "/api/companies", profile_body).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Students cannot create profiles.
    let resp = send_json(&app, "POST", &student, "/api/companies", json!({
        "name": "Student Co", "description": "x", "city": "Ghent"
    })).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // New posts start as drafts.
    let resp = send_json(&app, "POST", &company, "/api/posts", json!({
        "title": "Backend intern", "description": "Rust work", "field": "software", "city": "Ghent", "paid": true
    })).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post = json_body(resp).await?;
    let post_id = post["id"].as_str().expect("post id").to_string();
    assert_eq!(post["status"], "draft");

    // Applying to a draft is rejected.
    let resp = send_json(&app, "POST", &student, "/api/applications", json!({
        "post_id": post_id, "cover_letter": "Please hire me"
    })).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Publish, then the application goes through once.
    let resp = send_json(&app, "PUT", &company, &format!("/api/posts/{post_id}"), json!({
        "status": "published"
    })).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send_json(&app, "POST", &student, "/api/applications", json!({
        "post_id": post_id, "cover_letter": "Please hire me"
    })).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let application = json_body(resp).await?;
    let application_id = application["id"].as_str().expect("application id").to_string();
    assert_eq!(application["status"], "pending");

    let resp = send_json(&app, "POST", &student, "/api/applications", json!({
        "post_id": post_id, "cover_letter": "Please hire me again"
    })).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Both parties can read the application; outsiders cannot.
    let resp = get_with(&app, &student, &format!("/api/applications/{application_id}")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = get_with(&app, &company, &format!("/api/applications/{application_id}")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let outsider = signup(&app, "student").await?;
    let resp = get_with(&app, &outsider, &format!("/api/applications/{application_id}")).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Companies cannot apply.
    let resp = send_json(&app, "POST", &company, "/api/applications", json!({
        "post_id": post_id, "cover_letter": "I apply to myself"
    })).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Listing filters by post and status; the post owner sees the entry.
    let resp = get_with(&app, &company, &format!("/api/applications?post={post_id}&status=pending")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = json_body(resp).await?;
    assert_eq!(listed.as_array().expect("array").len(), 1);

    // The applying student sees their own entry; other students see nothing
    // even when naming the post directly.
    let resp = get_with(&app, &student, "/api/applications").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let mine = json_body(resp).await?;
    assert_eq!(mine.as_array().expect("array").len(), 1);

    let resp = get_with(&app, &outsider, &format!("/api/applications?post={post_id}")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let hidden = json_body(resp).await?;
    assert!(hidden.as_array().expect("array").is_empty());

    // Unknown status filter fails before the query runs.
    let resp = get_with(&app, &company, "/api/applications?status=waitlisted").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Students cannot decide; the owner accepts once, and only once.
    let resp = send_json(&app, "PATCH", &student, &format!("/api/applications/{application_id}/status"), json!({
        "status": "accepted"
    })).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send_json(&app, "PATCH", &company, &format!("/api/applications/{application_id}/status"), json!({
        "status": "accepted"
    })).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let decided = json_body(resp).await?;
    assert_eq!(decided["status"], "accepted");

    let resp = send_json(&app, "PATCH", &company, &format!("/api/applications/{application_id}/status"), json!({
        "status": "rejected"
    })).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Profile updates stay owner-only.
    let resp = send_json(&app, "PUT", &company, &format!("/api/companies/{profile_id}"), json!({
        "name": "Acme Renamed", "description": "Still everything", "city": "Ghent"
    })).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn post_listing_filters_and_sorting() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let company = signup(&app, "company").await?;

    let resp = send_json(&app, "POST", &company, "/api/companies", json!({
        "name": format!("Sorted {}", Uuid::new_v4()), "description": "x", "city": "Ghent"
    })).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let profile = json_body(resp).await?;
    let company_id = profile["id"].as_str().expect("profile id").to_string();

    for title in ["First post", "Second post"] {
        let resp = send_json(&app, "POST", &company, "/api/posts", json!({
            "title": title, "description": "x", "field": "software", "city": "Ghent", "paid": false
        })).await?;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = get_with(&app, &company, &format!("/api/posts?company={company_id}&sort=oldest")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let posts = json_body(resp).await?;
    let posts = posts.as_array().expect("array");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["title"], "First post");

    // Unknown status is rejected before the query.
    let resp = get_with(&app, &company, "/api/posts?status=archived").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown sort is rejected as well.
    let resp = get_with(&app, &company, "/api/posts?sort=loudest").await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn stats_and_uploads() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let student = signup(&app, "student").await?;

    // Visit tracking is anonymous.
    let req = Request::builder()
        .method("POST")
        .uri("/api/stats/visit")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"key": "landing"}))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let counted = json_body(resp).await?;
    assert_eq!(counted["key"], "landing");
    assert!(counted["value"].as_i64().expect("counter value") >= 1);

    // A bare POST with no body bumps the default counter.
    let req = Request::builder()
        .method("POST")
        .uri("/api/stats/visit")
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let counted = json_body(resp).await?;
    assert_eq!(counted["key"], "visits");
    assert!(counted["value"].as_i64().expect("counter value") >= 1);

    // Overview needs a session.
    let req = Request::builder().method("GET").uri("/api/stats").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = get_with(&app, &student, "/api/stats").await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let overview = json_body(resp).await?;
    assert!(overview["users"].as_u64().expect("users count") >= 1);
    assert!(overview["counters"]["landing"].as_i64().expect("landing counter") >= 1);

    // Presigning accepts the allow-listed types and nothing else.
    let resp = send_json(&app, "POST", &student, "/api/uploads/presign", json!({
        "file_name": "cv.pdf", "content_type": "application/pdf", "size_bytes": 1024
    })).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let presigned = json_body(resp).await?;
    let url = presigned["url"].as_str().expect("url");
    assert!(url.contains("X-Amz-Signature="));
    assert!(presigned["key"].as_str().expect("key").ends_with(".pdf"));

    let resp = send_json(&app, "POST", &student, "/api/uploads/presign", json!({
        "file_name": "tool.exe", "content_type": "application/x-msdownload", "size_bytes": 1024
    })).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send_json(&app, "POST", &student, "/api/uploads/presign", json!({
        "file_name": "huge.pdf", "content_type": "application/pdf", "size_bytes": 50 * 1024 * 1024
    })).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;
    let req = Request::builder().method("GET").uri("/health").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}
