//! Reconciler: rederives every locker's `is_available` flag from the
//! bookings table and drops bookings whose interval is inverted or empty.
//!
//! It runs before each request (see `handlers::reconcile_before_request`)
//! and is idempotent: running it twice with the same `now` changes nothing
//! the second time.

use crate::db;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Counts of rows touched by one reconcile pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Bookings deleted because `start_time >= end_time`.
    pub purged: u64,
    /// Lockers flipped to available.
    pub released: u64,
    /// Lockers flipped to unavailable.
    pub occupied: u64,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone)]
pub struct Reconciler {
    pub db: Arc<SqlitePool>,
}

impl Reconciler {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Run one full pass at `now` inside a single transaction.
    ///
    /// 1. delete bookings with `start_time >= end_time`
    /// 2. free lockers whose bookings have all ended (`end_time <= now`)
    /// 3. occupy lockers with a booking covering `now`, free every other one
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ReconcileReport, sqlx::Error> {
        let mut tx = db::begin_write(&self.db).await?;
        let mut report = ReconcileReport::default();

        report.purged = sqlx::query("DELETE FROM bookings WHERE start_time >= end_time")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        report.released += sqlx::query(
            "UPDATE lockers SET is_available = 1
             WHERE is_available = 0
               AND id IN (SELECT locker_id FROM bookings WHERE end_time <= ?)
               AND NOT EXISTS (SELECT 1 FROM bookings b
                               WHERE b.locker_id = lockers.id
                                 AND b.start_time <= ? AND b.end_time > ?)",
        )
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        report.occupied = sqlx::query(
            "UPDATE lockers SET is_available = 0
             WHERE is_available = 1
               AND EXISTS (SELECT 1 FROM bookings b
                           WHERE b.locker_id = lockers.id
                             AND b.start_time <= ? AND b.end_time > ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        report.released += sqlx::query(
            "UPDATE lockers SET is_available = 1
             WHERE is_available = 0
               AND NOT EXISTS (SELECT 1 FROM bookings b
                               WHERE b.locker_id = lockers.id
                                 AND b.start_time <= ? AND b.end_time > ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        Ok(report)
    }
}
