//! AuthService: registration, credential checks and login sessions.

use crate::{
    db,
    models::{session::Session, user::User},
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
    #[error("password must be at least {} characters", MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("an account with email `{0}` already exists")]
    DuplicateEmail(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hash error: {0}")]
    Hash(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;

pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_EMAIL_LEN: usize = 150;

/// Sessions older than this stop resolving and are purged at the next login.
pub const SESSION_TTL_DAYS: i64 = 30;

fn session_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(SESSION_TTL_DAYS)
}

const USER_COLUMNS: &str = "id, email, password_hash, created_at";

#[derive(Clone)]
pub struct AuthService {
    pub db: Arc<SqlitePool>,
}

impl AuthService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create an account. The caller is not logged in afterwards.
    pub async fn register(&self, email: &str, password: &str, now: DateTime<Utc>) -> AuthResult<User> {
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: hash_password(password)?,
            created_at: now,
        };

        match sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&*self.db)
        .await
        {
            Ok(_) => {
                info!(user = %user.id, "registered {}", user.email);
                Ok(user)
            }
            Err(err) if is_unique_violation(&err) => Err(AuthError::DuplicateEmail(user.email)),
            Err(err) => Err(AuthError::Sqlx(err)),
        }
    }

    /// Look up a user by email and verify the password.
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<User> {
        let email = normalize_email(email);
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(&email)
        .fetch_optional(&*self.db)
        .await?;

        let Some(user) = user else {
            debug!("login attempt for unknown email {}", email);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            debug!(user = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Start a session for `user` and return its token. Expired sessions of
    /// every user are dropped on the way.
    pub async fn create_session(&self, user: &User, now: DateTime<Utc>) -> AuthResult<Session> {
        let session = Session {
            token: Uuid::new_v4(),
            user_id: user.id,
            created_at: now,
        };

        let mut tx = db::begin_write(&self.db).await?;
        let purged = sqlx::query("DELETE FROM sessions WHERE created_at <= ?")
            .bind(session_cutoff(now))
            .execute(&mut *tx)
            .await?
            .rows_affected();
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(session.token)
            .bind(session.user_id)
            .bind(session.created_at)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        if purged > 0 {
            debug!("purged {} expired session(s)", purged);
        }
        info!(user = %user.id, "session started");
        Ok(session)
    }

    /// The user behind a session token, if the session exists and is younger
    /// than `SESSION_TTL_DAYS`.
    pub async fn resolve_session(&self, token: Uuid, now: DateTime<Utc>) -> AuthResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.created_at
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ? AND s.created_at > ?",
        )
        .bind(token)
        .bind(session_cutoff(now))
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    /// Drop a session. Unknown tokens are ignored.
    pub async fn end_session(&self, token: Uuid) -> AuthResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&*self.db)
            .await?;
        debug!("ended {} session(s)", result.rows_affected());
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> AuthResult<()> {
    let valid = email.len() <= MAX_EMAIL_LEN
        && !email.chars().any(char::is_whitespace)
        && match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if valid {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail(email.to_string()))
    }
}

fn hash_password(plain: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|p| p.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

fn verify_password(plain: &str, hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Return true if SQLx error indicates a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.message().to_ascii_lowercase().contains("unique")
    )
}
