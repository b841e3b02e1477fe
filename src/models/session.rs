//! Server-side login sessions referenced by the session cookie.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, FromRow, Debug)]
pub struct Session {
    /// Random token, also the cookie value.
    pub token: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
