//! Fixtures shared by the service and handler tests.

use crate::models::{booking::Booking, locker::Locker};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// 2025-06-02 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
}

/// Insert a user row directly, bypassing password hashing.
pub async fn insert_user(db: &SqlitePool, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(email)
        .bind("not-a-real-hash")
        .bind(at(0, 0))
        .execute(db)
        .await
        .unwrap();
    id
}

pub async fn locker_by_number(db: &SqlitePool, number: &str) -> Locker {
    sqlx::query_as::<_, Locker>("SELECT id, number, is_available FROM lockers WHERE number = ?")
        .bind(number)
        .fetch_one(db)
        .await
        .unwrap()
}

pub async fn set_available(db: &SqlitePool, locker_id: Uuid, available: bool) {
    sqlx::query("UPDATE lockers SET is_available = ? WHERE id = ?")
        .bind(available)
        .bind(locker_id)
        .execute(db)
        .await
        .unwrap();
}

/// Insert a booking without any validation, to set up invalid states.
pub async fn insert_booking_raw(
    db: &SqlitePool,
    user_id: Uuid,
    locker_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO bookings (id, user_id, locker_id, start_time, end_time, is_paid, created_at)
         VALUES (?, ?, ?, ?, ?, 0, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(locker_id)
    .bind(start)
    .bind(end)
    .bind(at(0, 0))
    .execute(db)
    .await
    .unwrap();
    id
}

pub async fn booking_exists(db: &SqlitePool, id: Uuid) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await
        .unwrap()
        > 0
}

pub async fn all_bookings(db: &SqlitePool) -> Vec<Booking> {
    sqlx::query_as::<_, Booking>(
        "SELECT id, user_id, locker_id, start_time, end_time, is_paid, created_at
         FROM bookings ORDER BY start_time",
    )
    .fetch_all(db)
    .await
    .unwrap()
}

pub async fn booking_by_id(db: &SqlitePool, id: Uuid) -> Option<Booking> {
    sqlx::query_as::<_, Booking>(
        "SELECT id, user_id, locker_id, start_time, end_time, is_paid, created_at
         FROM bookings WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .unwrap()
}
