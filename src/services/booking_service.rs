//! src/services/booking_service.rs
//!
//! BookingService: creates, pays for, cancels and lists locker bookings.
//! Interval exclusivity per locker is enforced inside SQLite: the overlap
//! check and the insert are one guarded statement within a transaction.
//! All intervals are half-open `[start_time, end_time)`.

use crate::{
    db,
    models::{
        booking::{Booking, BookingPartition, BookingView},
        locker::{Locker, LockerStatus, Occupancy},
    },
};
use chrono::{DateTime, Datelike, SubsecRound, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("booking must end after it starts")]
    InvalidInterval,
    #[error("booking times must fall within the years {}..={}", MIN_YEAR, MAX_YEAR)]
    TimeOutOfRange,
    #[error("locker `{0}` is already taken for the requested interval")]
    LockerUnavailable(String),
    #[error("locker `{0}` not found")]
    LockerNotFound(Uuid),
    #[error("booking `{0}` not found")]
    NotFound(Uuid),
    #[error("booking `{0}` belongs to another user")]
    Forbidden(Uuid),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type BookingResult<T> = Result<T, BookingError>;

/// Stored times are RFC 3339 text compared as strings, which only orders
/// correctly for four-digit, non-negative years.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// True when `t` keeps its chronological order as stored text.
pub fn is_storable(t: DateTime<Utc>) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&t.year())
}

/// A reservation request as submitted by a user.
#[derive(Clone, Debug)]
pub struct NewBooking {
    pub locker_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Result of a pay request. Paying twice is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayOutcome {
    Paid,
    AlreadyPaid,
}

/// Where a booking sits relative to a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingPhase {
    Current,
    Future,
    Past,
}

/// Classify `[start, end)` against `now`. Every interval gets exactly one phase.
pub fn phase_of(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> BookingPhase {
    if start <= now && now < end {
        BookingPhase::Current
    } else if start > now {
        BookingPhase::Future
    } else {
        // start <= now and end <= now
        BookingPhase::Past
    }
}

#[derive(Clone)]
pub struct BookingService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

const BOOKING_COLUMNS: &str =
    "id, user_id, locker_id, start_time, end_time, is_paid, created_at";

impl BookingService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Lockers with no booking covering `now`, in label order.
    ///
    /// This is a point-in-time filter: a locker that is free now but booked
    /// later is still offered, and the overlap check decides on submit.
    pub async fn offerable_lockers(&self, now: DateTime<Utc>) -> BookingResult<Vec<Locker>> {
        let lockers = sqlx::query_as::<_, Locker>(
            "SELECT id, number, is_available FROM lockers l
             WHERE NOT EXISTS (SELECT 1 FROM bookings b
                               WHERE b.locker_id = l.id
                                 AND b.start_time <= ? AND b.end_time > ?)
             ORDER BY length(number), number",
        )
        .bind(now)
        .bind(now)
        .fetch_all(&*self.db)
        .await?;
        Ok(lockers)
    }

    /// Reserve a locker for `[start, end)` on behalf of `user_id`.
    ///
    /// Fails with:
    /// - `TimeOutOfRange` when either bound lies outside years 0000-9999
    /// - `InvalidInterval` when `start >= end`
    /// - `LockerNotFound` for an unknown locker
    /// - `LockerUnavailable` when the locker is occupied at `now` or any
    ///   existing booking on it overlaps the requested interval
    ///
    /// Marks the locker unavailable when the new booking covers `now`.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        req: NewBooking,
        now: DateTime<Utc>,
    ) -> BookingResult<Booking> {
        let start = req.start.trunc_subsecs(0);
        let end = req.end.trunc_subsecs(0);
        if !is_storable(start) || !is_storable(end) {
            return Err(BookingError::TimeOutOfRange);
        }
        if start >= end {
            return Err(BookingError::InvalidInterval);
        }

        let mut tx = db::begin_write(&self.db).await?;

        let locker = fetch_locker(&mut tx, req.locker_id).await?;
        if locker_busy_at(&mut tx, locker.id, now).await? {
            debug!("locker {} is occupied at {}, not offerable", locker.number, now);
            return Err(BookingError::LockerUnavailable(locker.number));
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            locker_id: locker.id,
            start_time: start,
            end_time: end,
            is_paid: false,
            created_at: now,
        };

        // Check and insert in one statement so no concurrent writer can
        // slip an overlapping row in between.
        let inserted = sqlx::query(
            "INSERT INTO bookings (id, user_id, locker_id, start_time, end_time, is_paid, created_at)
             SELECT ?, ?, ?, ?, ?, 0, ?
             WHERE NOT EXISTS (SELECT 1 FROM bookings
                               WHERE locker_id = ? AND end_time > ? AND start_time < ?)",
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.locker_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.created_at)
        .bind(booking.locker_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            debug!(
                "overlap on locker {} for [{}, {})",
                locker.number, booking.start_time, booking.end_time
            );
            return Err(BookingError::LockerUnavailable(locker.number));
        }

        if booking.covers(now) {
            set_locker_available(&mut tx, locker.id, false).await?;
        }

        tx.commit().await?;

        info!(
            booking = %booking.id,
            user = %user_id,
            "booked locker {} for [{}, {})",
            locker.number,
            booking.start_time,
            booking.end_time
        );
        Ok(booking)
    }

    /// Mark a booking as paid. Only the owner may pay.
    pub async fn pay_booking(&self, booking_id: Uuid, user_id: Uuid) -> BookingResult<PayOutcome> {
        let mut tx = db::begin_write(&self.db).await?;
        let booking = fetch_booking(&mut tx, booking_id).await?;
        ensure_owner(&booking, user_id)?;

        if booking.is_paid {
            return Ok(PayOutcome::AlreadyPaid);
        }

        sqlx::query("UPDATE bookings SET is_paid = 1 WHERE id = ?")
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(booking = %booking_id, "booking paid");
        Ok(PayOutcome::Paid)
    }

    /// Cancel (delete) a booking and free its locker. Only the owner may cancel.
    ///
    /// The locker stays unavailable if some other booking still covers `now`;
    /// that can only happen when the no-overlap invariant was broken, and it
    /// is logged as an error.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> BookingResult<Booking> {
        let mut tx = db::begin_write(&self.db).await?;
        let booking = fetch_booking(&mut tx, booking_id).await?;
        ensure_owner(&booking, user_id)?;

        let still_covered: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings
             WHERE locker_id = ? AND id != ? AND start_time <= ? AND end_time > ?",
        )
        .bind(booking.locker_id)
        .bind(booking.id)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        if still_covered > 0 {
            error!(
                booking = %booking.id,
                locker = %booking.locker_id,
                "{} other booking(s) cover the locker at {}; overlapping bookings exist",
                still_covered,
                now
            );
        }
        set_locker_available(&mut tx, booking.locker_id, still_covered == 0).await?;

        sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(booking.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(booking = %booking.id, user = %user_id, "booking cancelled");
        Ok(booking)
    }

    /// A user's bookings joined with locker numbers, split into
    /// current / future / past relative to `now`.
    pub async fn list_bookings_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> BookingResult<BookingPartition> {
        let rows = sqlx::query_as::<_, BookingView>(
            "SELECT b.id, l.number AS locker_number,
                    b.start_time, b.end_time, b.is_paid
             FROM bookings b
             JOIN lockers l ON l.id = b.locker_id
             WHERE b.user_id = ?
             ORDER BY b.start_time ASC",
        )
        .bind(user_id)
        .fetch_all(&*self.db)
        .await?;

        let mut partition = BookingPartition::default();
        for view in rows {
            match phase_of(view.start_time, view.end_time, now) {
                BookingPhase::Current => partition.current.push(view),
                BookingPhase::Future => partition.future.push(view),
                BookingPhase::Past => partition.past.push(view),
            }
        }
        Ok(partition)
    }

    /// Occupancy of every locker at `now`.
    ///
    /// A booking counts while `start_time <= now <= end_time`; the end is
    /// inclusive here, unlike everywhere else.
    pub async fn list_locker_status(&self, now: DateTime<Utc>) -> BookingResult<Vec<LockerStatus>> {
        let rows: Vec<(String, bool)> = sqlx::query_as(
            "SELECT l.number,
                    EXISTS (SELECT 1 FROM bookings b
                            WHERE b.locker_id = l.id
                              AND b.start_time <= ? AND b.end_time >= ?) AS occupied
             FROM lockers l
             ORDER BY length(l.number), l.number",
        )
        .bind(now)
        .bind(now)
        .fetch_all(&*self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(number, occupied)| LockerStatus {
                number,
                occupancy: if occupied {
                    Occupancy::Occupied
                } else {
                    Occupancy::Free
                },
            })
            .collect())
    }
}

fn ensure_owner(booking: &Booking, user_id: Uuid) -> BookingResult<()> {
    if booking.user_id != user_id {
        return Err(BookingError::Forbidden(booking.id));
    }
    Ok(())
}

async fn fetch_booking(conn: &mut SqliteConnection, booking_id: Uuid) -> BookingResult<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {} FROM bookings WHERE id = ?",
        BOOKING_COLUMNS
    ))
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(BookingError::NotFound(booking_id))
}

async fn fetch_locker(conn: &mut SqliteConnection, locker_id: Uuid) -> BookingResult<Locker> {
    sqlx::query_as::<_, Locker>("SELECT id, number, is_available FROM lockers WHERE id = ?")
        .bind(locker_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(BookingError::LockerNotFound(locker_id))
}

async fn locker_busy_at(
    conn: &mut SqliteConnection,
    locker_id: Uuid,
    now: DateTime<Utc>,
) -> BookingResult<bool> {
    let busy: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM bookings
                        WHERE locker_id = ? AND start_time <= ? AND end_time > ?)",
    )
    .bind(locker_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Ok(busy)
}

async fn set_locker_available(
    conn: &mut SqliteConnection,
    locker_id: Uuid,
    available: bool,
) -> BookingResult<()> {
    sqlx::query("UPDATE lockers SET is_available = ? WHERE id = ?")
        .bind(available)
        .bind(locker_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{TempDb, test_pool},
        services::test_support::*,
    };
    use chrono::TimeZone;

    async fn service() -> BookingService {
        BookingService::new(Arc::new(test_pool().await))
    }

    fn total(parts: &BookingPartition) -> usize {
        parts.current.len() + parts.future.len() + parts.past.len()
    }

    fn req(locker_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> NewBooking {
        NewBooking {
            locker_id,
            start,
            end,
        }
    }

    #[tokio::test]
    async fn inverted_or_empty_interval_is_rejected_and_nothing_persisted() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;

        let err = svc
            .create_booking(user, req(l1.id, at(11, 0), at(10, 0)), at(9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidInterval));

        let err = svc
            .create_booking(user, req(l1.id, at(10, 0), at(10, 0)), at(9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidInterval));

        assert!(all_bookings(&svc.db).await.is_empty());
    }

    #[tokio::test]
    async fn five_digit_years_are_rejected_before_they_reach_storage() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let far = Utc.with_ymd_and_hms(10000, 1, 1, 10, 0, 0).unwrap();

        let err = svc
            .create_booking(user, req(l1.id, at(10, 0), far), at(9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::TimeOutOfRange));
        assert!(all_bookings(&svc.db).await.is_empty());

        // The slot stays bookable, and a later overlapping request is still caught.
        svc.create_booking(user, req(l1.id, at(10, 0), at(14, 0)), at(9, 0))
            .await
            .unwrap();
        let err = svc
            .create_booking(user, req(l1.id, at(12, 0), at(13, 0)), at(9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::LockerUnavailable(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_neither_fail_nor_overlap() {
        let temp = TempDb::new().await;
        let svc = BookingService::new(Arc::new(temp.pool.clone()));
        let user = insert_user(&svc.db, "a@example.com").await;
        let mut lockers = Vec::new();
        for n in 1..=5 {
            lockers.push(locker_by_number(&svc.db, &format!("L-{}", n)).await.id);
        }

        let mut tasks = tokio::task::JoinSet::new();
        // 40 disjoint slots spread over all lockers.
        for i in 0..40u32 {
            let svc = svc.clone();
            let locker = lockers[(i % 5) as usize];
            let hour = 10 + i / 5;
            tasks.spawn(async move {
                svc.create_booking(user, req(locker, at(hour, 0), at(hour + 1, 0)), at(9, 0))
                    .await
                    .map(|_| true)
            });
        }
        // 10 racers for one slot on L-1.
        for _ in 0..10 {
            let svc = svc.clone();
            let locker = lockers[0];
            tasks.spawn(async move {
                match svc
                    .create_booking(user, req(locker, at(20, 0), at(21, 0)), at(9, 0))
                    .await
                {
                    Ok(_) => Ok(true),
                    Err(BookingError::LockerUnavailable(_)) => Ok(false),
                    Err(err) => Err(err),
                }
            });
        }

        let mut accepted = 0;
        while let Some(joined) = tasks.join_next().await {
            if joined.unwrap().unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 41);
        assert_eq!(all_bookings(&svc.db).await.len(), 41);
    }

    #[tokio::test]
    async fn unknown_locker_is_not_found() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let err = svc
            .create_booking(user, req(Uuid::new_v4(), at(10, 0), at(11, 0)), at(9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::LockerNotFound(_)));
    }

    #[tokio::test]
    async fn overlap_scenario_on_one_locker() {
        let svc = service().await;
        let alice = insert_user(&svc.db, "alice@example.com").await;
        let bob = insert_user(&svc.db, "bob@example.com").await;
        let carol = insert_user(&svc.db, "carol@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let now = at(9, 0);

        svc.create_booking(alice, req(l1.id, at(10, 0), at(11, 0)), now)
            .await
            .unwrap();
        // Not active yet, so the locker stays available.
        assert!(locker_by_number(&svc.db, "L-1").await.is_available);

        let err = svc
            .create_booking(bob, req(l1.id, at(10, 30), at(10, 45)), now)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::LockerUnavailable(ref n) if n == "L-1"));

        // Touching endpoints do not overlap.
        svc.create_booking(carol, req(l1.id, at(11, 0), at(12, 0)), now)
            .await
            .unwrap();
        svc.create_booking(carol, req(l1.id, at(9, 30), at(10, 0)), now)
            .await
            .unwrap();

        let err = svc
            .create_booking(bob, req(l1.id, at(8, 0), at(13, 0)), now)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::LockerUnavailable(_)));

        let bookings = all_bookings(&svc.db).await;
        assert_eq!(bookings.len(), 3);
        for pair in bookings.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time);
        }
    }

    #[tokio::test]
    async fn same_interval_on_other_locker_is_fine() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let l2 = locker_by_number(&svc.db, "L-2").await;

        svc.create_booking(user, req(l1.id, at(10, 0), at(11, 0)), at(9, 0))
            .await
            .unwrap();
        svc.create_booking(user, req(l2.id, at(10, 0), at(11, 0)), at(9, 0))
            .await
            .unwrap();
        assert_eq!(all_bookings(&svc.db).await.len(), 2);
    }

    #[tokio::test]
    async fn active_booking_occupies_locker_and_hides_it_from_offer() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let now = at(10, 15);

        svc.create_booking(user, req(l1.id, at(10, 0), at(11, 0)), now)
            .await
            .unwrap();
        assert!(!locker_by_number(&svc.db, "L-1").await.is_available);

        let offered = svc.offerable_lockers(now).await.unwrap();
        let numbers: Vec<_> = offered.iter().map(|l| l.number.as_str()).collect();
        assert_eq!(numbers, vec!["L-2", "L-3", "L-4", "L-5"]);

        // Busy right now, so even a later slot is refused.
        let err = svc
            .create_booking(user, req(l1.id, at(14, 0), at(15, 0)), now)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::LockerUnavailable(_)));
    }

    #[tokio::test]
    async fn pay_is_idempotent() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let booking = svc
            .create_booking(user, req(l1.id, at(10, 0), at(11, 0)), at(9, 0))
            .await
            .unwrap();
        assert!(!booking.is_paid);

        assert_eq!(svc.pay_booking(booking.id, user).await.unwrap(), PayOutcome::Paid);
        assert!(booking_by_id(&svc.db, booking.id).await.unwrap().is_paid);

        assert_eq!(
            svc.pay_booking(booking.id, user).await.unwrap(),
            PayOutcome::AlreadyPaid
        );
        assert!(booking_by_id(&svc.db, booking.id).await.unwrap().is_paid);
    }

    #[tokio::test]
    async fn pay_checks_existence_and_ownership() {
        let svc = service().await;
        let owner = insert_user(&svc.db, "owner@example.com").await;
        let other = insert_user(&svc.db, "other@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let booking = svc
            .create_booking(owner, req(l1.id, at(10, 0), at(11, 0)), at(9, 0))
            .await
            .unwrap();

        let err = svc.pay_booking(Uuid::new_v4(), owner).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));

        let err = svc.pay_booking(booking.id, other).await.unwrap_err();
        assert!(matches!(err, BookingError::Forbidden(_)));
        assert!(!booking_by_id(&svc.db, booking.id).await.unwrap().is_paid);
    }

    #[tokio::test]
    async fn cancel_by_non_owner_is_forbidden_and_keeps_booking() {
        let svc = service().await;
        let owner = insert_user(&svc.db, "owner@example.com").await;
        let other = insert_user(&svc.db, "other@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let booking = svc
            .create_booking(owner, req(l1.id, at(10, 0), at(11, 0)), at(10, 30))
            .await
            .unwrap();

        let err = svc
            .cancel_booking(booking.id, other, at(10, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Forbidden(_)));
        assert!(booking_exists(&svc.db, booking.id).await);
        assert!(!locker_by_number(&svc.db, "L-1").await.is_available);
    }

    #[tokio::test]
    async fn cancel_deletes_and_frees_locker() {
        let svc = service().await;
        let owner = insert_user(&svc.db, "owner@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let now = at(10, 30);
        let booking = svc
            .create_booking(owner, req(l1.id, at(10, 0), at(11, 0)), now)
            .await
            .unwrap();

        let cancelled = svc.cancel_booking(booking.id, owner, now).await.unwrap();
        assert_eq!(cancelled.id, booking.id);
        assert!(!booking_exists(&svc.db, booking.id).await);
        assert!(locker_by_number(&svc.db, "L-1").await.is_available);

        let err = svc.cancel_booking(booking.id, owner, now).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn cancel_keeps_locker_busy_when_another_booking_covers_now() {
        let svc = service().await;
        let owner = insert_user(&svc.db, "owner@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let now = at(10, 30);
        // Overlapping rows can only be planted behind the service's back.
        let first = insert_booking_raw(&svc.db, owner, l1.id, at(10, 0), at(11, 0)).await;
        insert_booking_raw(&svc.db, owner, l1.id, at(10, 15), at(10, 45)).await;
        set_available(&svc.db, l1.id, false).await;

        svc.cancel_booking(first, owner, now).await.unwrap();
        assert!(!locker_by_number(&svc.db, "L-1").await.is_available);
    }

    #[tokio::test]
    async fn user_bookings_are_partitioned_exactly_once() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let other = insert_user(&svc.db, "b@example.com").await;
        let l1 = locker_by_number(&svc.db, "L-1").await;
        let l2 = locker_by_number(&svc.db, "L-2").await;

        insert_booking_raw(&svc.db, user, l1.id, at(8, 0), at(9, 0)).await;
        insert_booking_raw(&svc.db, user, l1.id, at(9, 0), at(10, 0)).await;
        insert_booking_raw(&svc.db, user, l1.id, at(10, 0), at(11, 0)).await;
        insert_booking_raw(&svc.db, user, l2.id, at(12, 0), at(13, 0)).await;
        insert_booking_raw(&svc.db, other, l2.id, at(9, 0), at(11, 0)).await;

        let now = at(10, 0);
        let parts = svc.list_bookings_for_user(user, now).await.unwrap();
        assert_eq!(total(&parts), 4);
        assert_eq!(parts.current.len(), 1);
        assert_eq!(parts.current[0].start_time, at(10, 0));
        assert_eq!(parts.current[0].locker_number, "L-1");
        assert_eq!(parts.future.len(), 1);
        assert_eq!(parts.future[0].locker_number, "L-2");
        assert_eq!(parts.past.len(), 2);

        // Sweep `now` across the day: each booking lands in exactly one bucket.
        for hour in 7..15 {
            let parts = svc.list_bookings_for_user(user, at(hour, 0)).await.unwrap();
            assert_eq!(total(&parts), 4, "at {}:00", hour);
        }
    }

    #[test]
    fn phase_boundaries_are_half_open() {
        let (s, e) = (at(10, 0), at(11, 0));
        assert_eq!(phase_of(s, e, at(9, 59)), BookingPhase::Future);
        assert_eq!(phase_of(s, e, at(10, 0)), BookingPhase::Current);
        assert_eq!(phase_of(s, e, at(10, 59)), BookingPhase::Current);
        assert_eq!(phase_of(s, e, at(11, 0)), BookingPhase::Past);
    }

    #[tokio::test]
    async fn locker_status_treats_end_as_inclusive() {
        let svc = service().await;
        let user = insert_user(&svc.db, "a@example.com").await;
        let l2 = locker_by_number(&svc.db, "L-2").await;
        insert_booking_raw(&svc.db, user, l2.id, at(10, 0), at(11, 0)).await;

        let status = svc.list_locker_status(at(11, 0)).await.unwrap();
        assert_eq!(status.len(), 5);
        assert_eq!(status[0].number, "L-1");
        assert_eq!(status[0].occupancy, Occupancy::Free);
        assert_eq!(status[1].number, "L-2");
        assert_eq!(status[1].occupancy, Occupancy::Occupied);

        let status = svc.list_locker_status(at(11, 1)).await.unwrap();
        assert!(status.iter().all(|s| s.occupancy == Occupancy::Free));
    }
}
