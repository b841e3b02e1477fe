//! Core data models for the locker booking service.
//!
//! These are plain records: they map to database tables via `sqlx::FromRow`
//! and carry no relationship traversal. Joins happen in the services.

pub mod booking;
pub mod locker;
pub mod session;
pub mod user;
