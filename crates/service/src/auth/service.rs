use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        models::user::validate_role(&input.role)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&input.email, &input.name, &input.role).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and optionally issue a token.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            let exp = (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize;
            let claims = Claims { sub: user.email.clone(), uid: user.id, role: user.role.clone(), exp };
            token = Some(
                encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
                    .map_err(|e| AuthError::TokenError(e.to_string()))?,
            );
        }

        Ok(AuthSession { user, token })
    }
}

/// Decode and verify an HS256 token, validating expiry.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc(secret: Option<&str>) -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: secret.map(str::to_string), password_algorithm: "argon2".into() },
        )
    }

    #[tokio::test]
    async fn register_then_login_roundtrip() {
        let svc = svc(Some("secret"));
        let user = svc.register(RegisterInput {
            email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), role: "student".into(),
        }).await.unwrap();
        assert_eq!(user.email, "u@e.com");

        let session = svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() }).await.unwrap();
        assert_eq!(session.user.id, user.id);
        let token = session.token.expect("token issued");
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.role, "student");
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let svc = svc(None);
        let err = svc.register(RegisterInput {
            email: "u@e.com".into(), name: "N".into(), password: "short".into(), role: "student".into(),
        }).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_role_rejected() {
        let svc = svc(None);
        let err = svc.register(RegisterInput {
            email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), role: "wizard".into(),
        }).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = svc(None);
        let input = RegisterInput {
            email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), role: "company".into(),
        };
        svc.register(input.clone()).await.unwrap();
        let err = svc.register(input).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn wrong_password_unauthorized() {
        let svc = svc(Some("secret"));
        svc.register(RegisterInput {
            email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), role: "student".into(),
        }).await.unwrap();
        let err = svc.login(LoginInput { email: "u@e.com".into(), password: "nope-nope".into() }).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[test]
    fn bad_token_rejected() {
        assert!(verify_token("not-a-jwt", "secret").is_err());
    }
}
