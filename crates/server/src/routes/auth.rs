use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use service::auth::{
    domain::{Claims, LoginInput, RegisterInput},
    repo::seaorm::SeaOrmAuthRepository,
    service::{verify_token, AuthConfig, AuthService},
};
use service::mailer::Mailer;
use service::uploads::presign::Presigner;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub mailer: Arc<Mailer>,
    pub presigner: Arc<Presigner>,
}

impl ServerState {
    fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(
            repo,
            AuthConfig {
                jwt_secret: Some(self.auth.jwt_secret.clone()),
                password_algorithm: "argon2".into(),
            },
        )
    }
}

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub email: String, pub name: String, pub role: String, pub token: String }

#[derive(Serialize)]
pub struct MeOutput { pub user_id: Uuid, pub email: String, pub name: String, pub role: String }

fn auth_error_response(e: service::auth::errors::AuthError) -> JsonApiError {
    use service::auth::errors::AuthError;
    match e {
        AuthError::Validation(_) => JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string())),
        AuthError::Conflict => JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(e.to_string())),
        AuthError::Unauthorized | AuthError::NotFound => {
            JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("invalid credentials".into()))
        }
        _ => JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())),
    }
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, JsonApiError> {
    let svc = state.auth_service();
    let user = svc.register(input).await.map_err(auth_error_response)?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let svc = state.auth_service();
    let session = svc.login(input).await.map_err(auth_error_response)?;
    let user = session.user;
    if let Some(token) = session.token {
        let mut cookie = Cookie::new("auth_token", token.clone());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(false);
        cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
        let jar = jar.add(cookie);
        let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token };
        return Ok((jar, Json(out)));
    }
    Err(JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some("token generation failed".into())))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

/// Claims were already verified by the middleware; the lookup also confirms
/// the account still exists.
pub async fn me(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeOutput>, JsonApiError> {
    let found = models::user::find_by_email(&state.db, &claims.sub)
        .await
        .map_err(|e| JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())))?
        .ok_or_else(|| JsonApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("account no longer exists".into())))?;
    Ok(Json(MeOutput { user_id: found.id, email: found.email, name: found.name, role: found.role }))
}

/// Role guard used inside handlers; claims were verified by the middleware.
pub fn require_role(claims: &Claims, role: &str) -> Result<(), JsonApiError> {
    if claims.role != role {
        return Err(JsonApiError::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            Some(format!("requires {role} role")),
        ));
    }
    Ok(())
}

/// Global middleware: outside the whitelist, require a valid
/// `Authorization: Bearer <token>` header or `auth_token` cookie.
/// Missing token yields 401; invalid or expired tokens yield 401.
/// Verified claims are injected into request extensions for handlers.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    // Whitelist: health, login/register, docs, visit tracking, CORS preflight
    if path == "/health"
        || path == "/api/auth/login"
        || path == "/api/auth/register"
        || path == "/api/stats/visit"
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || method == axum::http::Method::OPTIONS
    {
        return Ok(next.run(req).await);
    }

    // Authorization header first; fall back to the auth_token cookie.
    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let prefix = "Bearer ";
            if !h.starts_with(prefix) {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
            h[prefix.len()..].to_string()
        } else {
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                    return Err(StatusCode::UNAUTHORIZED);
                }
            }
        }
    };

    match verify_token(&token, &state.auth.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
