use std::sync::Arc;
use crate::domain::{
    models::{session::Session, user::User},
    ports::{SessionRepository, UserRepository},
};
use crate::error::AppError;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

pub const SESSION_COOKIE: &str = "session_id";

pub struct AuthService {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(sessions: Arc<dyn SessionRepository>, users: Arc<dyn UserRepository>, session_ttl_hours: i64) -> Self {
        Self {
            sessions,
            users,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalWithMsg(format!("password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        match PasswordHash::new(password_hash) {
            Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Looks up the user and checks the password. `None` on any mismatch.
    pub async fn check_credentials(&self, username: &str, password: &str) -> Result<Option<User>, AppError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => return Ok(None),
        };
        if self.verify_password(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Opens a session and returns the raw token for the cookie.
    pub async fn login(&self, user: &User) -> Result<String, AppError> {
        let token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        let now = Utc::now();

        let session = Session {
            token_hash: self.hash_token(&token),
            user_id: user.id,
            expires_at: now + self.session_ttl,
            created_at: now,
        };
        self.sessions.create(&session).await?;

        let purged = self.sessions.delete_expired(now).await?;
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }

        info!("User logged in: {}", user.id);
        Ok(token)
    }

    /// Resolves a cookie token to its user. Expired sessions are removed and never authenticate.
    pub async fn authenticate(&self, raw_token: &str) -> Result<Option<User>, AppError> {
        let token_hash = self.hash_token(raw_token);
        let session = match self.sessions.find_by_hash(&token_hash).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired(Utc::now()) {
            self.sessions.delete(&token_hash).await?;
            return Ok(None);
        }

        self.users.find_by_id(session.user_id).await
    }

    pub async fn logout(&self, raw_token: &str) -> Result<(), AppError> {
        let token_hash = self.hash_token(raw_token);
        self.sessions.delete(&token_hash).await
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
