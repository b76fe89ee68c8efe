use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::gateway::{GatewayError, GatewayResult, IdentityProvider};
use crate::session::{Session, SessionUser};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Signing material and lifetime for issued tokens
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub expiry_hours: u64,
}

impl TokenSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            secret: config.security.jwt_secret.clone(),
            expiry_hours: config.security.jwt_expiry_hours,
        }
    }
}

pub fn generate_jwt(claims: &Claims, settings: &TokenSettings) -> Result<String, JwtError> {
    if settings.secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(settings.secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str, settings: &TokenSettings) -> Result<Claims, JwtError> {
    if settings.secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(settings.secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Stored identity with its password hash
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email is already registered
    async fn create_user(&self, email: &str, password_hash: &str) -> GatewayResult<UserAccount>;

    async fn find_user_by_email(&self, email: &str) -> GatewayResult<Option<UserAccount>>;
}

/// Server-side identity provider: bcrypt credentials, stateless JWT sessions
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenSettings,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenSettings, bcrypt_cost: u32) -> Self {
        Self { users, tokens, bcrypt_cost }
    }

    pub fn tokens(&self) -> &TokenSettings {
        &self.tokens
    }

    fn issue(&self, account: &UserAccount) -> GatewayResult<Session> {
        let claims = Claims::new(account.id, account.email.clone(), self.tokens.expiry_hours);
        let access_token = generate_jwt(&claims, &self.tokens).map_err(|e| {
            tracing::error!("Failed to issue token: {}", e);
            GatewayError::Backend("failed to issue session token".to_string())
        })?;

        Ok(Session {
            access_token,
            user: SessionUser {
                id: account.id,
                email: account.email.clone(),
            },
            expires_at: claims.expires_at(),
        })
    }

    fn check_credentials_shape(email: &str, password: &str) -> GatewayResult<()> {
        if email.is_empty() || !email.contains('@') {
            return Err(GatewayError::rejected("A valid email is required"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(GatewayError::rejected(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for AuthService {
    async fn sign_up(&self, email: &str, password: &str) -> GatewayResult<Session> {
        let email = normalize_email(email);
        Self::check_credentials_shape(&email, password)?;

        let hash = hash_password(password, self.bcrypt_cost).map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            GatewayError::Backend("failed to store credentials".to_string())
        })?;
        let account = self.users.create_user(&email, &hash).await?;

        info!("Registered user {}", account.id);
        self.issue(&account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> GatewayResult<Session> {
        let email = normalize_email(email);
        let account = self.users.find_user_by_email(&email).await?;

        match account {
            Some(account) if verify_password(password, &account.password_hash) => {
                info!("User {} signed in", account.id);
                self.issue(&account)
            }
            _ => {
                warn!("Rejected sign-in attempt");
                Err(GatewayError::Unauthorized("Invalid email or password".to_string()))
            }
        }
    }

    async fn sign_out(&self, session: &Session) -> GatewayResult<()> {
        // Tokens are stateless; the client drops its copy
        info!("User {} signed out", session.user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryBackend;

    fn service() -> AuthService {
        let tokens = TokenSettings {
            secret: "test-secret".to_string(),
            expiry_hours: 1,
        };
        AuthService::new(Arc::new(MemoryBackend::new()), tokens, 4)
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_issues_valid_tokens() {
        let auth = service();
        let created = auth.sign_up("Chef@Example.com", "secret1").await.unwrap();
        assert_eq!(created.user.email, "chef@example.com");

        let session = auth.sign_in("chef@example.com", "secret1").await.unwrap();
        assert_eq!(session.user.id, created.user.id);

        let claims = validate_jwt(&session.access_token, auth.tokens()).unwrap();
        assert_eq!(claims.sub, created.user.id);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let auth = service();
        auth.sign_up("chef@example.com", "secret1").await.unwrap();
        let err = auth.sign_in("chef@example.com", "secret2").await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn duplicate_sign_up_conflicts() {
        let auth = service();
        auth.sign_up("chef@example.com", "secret1").await.unwrap();
        let err = auth.sign_up("chef@example.com", "secret1").await.unwrap_err();
        assert!(matches!(err, GatewayError::Conflict(_)));
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let err = service().sign_up("chef@example.com", "abc").await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected { .. }));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let settings = TokenSettings {
            secret: String::new(),
            expiry_hours: 1,
        };
        let claims = Claims::new(Uuid::new_v4(), "a@b.c".to_string(), 1);
        assert!(matches!(generate_jwt(&claims, &settings), Err(JwtError::InvalidSecret)));
    }
}
