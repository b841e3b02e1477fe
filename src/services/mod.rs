//! Business logic over the SQLite store.

pub mod auth_service;
pub mod booking_service;
pub mod reconciler;

#[cfg(test)]
pub mod test_support;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time truncated to whole seconds.
///
/// Stored timestamps are whole seconds, which keeps SQLite's text ordering
/// of RFC 3339 values chronological.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
