//! Represents a registered account.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user who can own bookings.
#[derive(Clone, FromRow, Debug)]
pub struct User {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Login email, unique, stored trimmed and lowercased.
    pub email: String,

    /// Argon2 PHC string (algorithm, params, salt and hash).
    pub password_hash: String,

    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}
