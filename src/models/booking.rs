//! Represents a reservation of one locker by one user.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A half-open reservation `[start_time, end_time)` of a locker.
///
/// Invariants kept by the booking service:
/// - `start_time < end_time`
/// - bookings on the same locker never overlap
#[derive(Clone, FromRow, Debug, PartialEq, Eq)]
pub struct Booking {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Owner; the only user allowed to pay or cancel.
    pub user_id: Uuid,

    /// Reserved locker.
    pub locker_id: Uuid,

    /// Inclusive start of the reservation.
    pub start_time: DateTime<Utc>,

    /// Exclusive end of the reservation.
    pub end_time: DateTime<Utc>,

    /// Set once by the owner; never reset.
    pub is_paid: bool,

    /// When the booking was made.
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// True when `now` falls inside `[start_time, end_time)`.
    pub fn covers(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now < self.end_time
    }
}

/// A booking joined with the number of its locker, for display.
#[derive(Clone, FromRow, Debug)]
pub struct BookingView {
    pub id: Uuid,
    pub locker_number: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub is_paid: bool,
}

/// A user's bookings split relative to a point in time.
///
/// - `current`: `start_time <= now < end_time`
/// - `future`: `start_time > now`
/// - `past`: `end_time <= now`
#[derive(Clone, Debug, Default)]
pub struct BookingPartition {
    pub current: Vec<BookingView>,
    pub future: Vec<BookingView>,
    pub past: Vec<BookingView>,
}
