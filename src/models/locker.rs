//! Represents a physical locker that can be reserved.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A locker with its cached availability flag.
///
/// `is_available` is not authoritative. It mirrors "no booking covers now"
/// and the reconciler rewrites it from the bookings table.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct Locker {
    pub id: Uuid,

    /// Human-readable label such as `L-1`.
    pub number: String,

    pub is_available: bool,
}

/// Occupancy of a locker at a point in time, as shown on `/lockers`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupancy {
    Occupied,
    Free,
}

impl Occupancy {
    pub fn label(self) -> &'static str {
        match self {
            Occupancy::Occupied => "occupied",
            Occupancy::Free => "free",
        }
    }
}

/// One row of the public locker status listing.
#[derive(Clone, Debug)]
pub struct LockerStatus {
    pub number: String,
    pub occupancy: Occupancy,
}
