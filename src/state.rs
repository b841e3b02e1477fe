use crate::services::{
    auth_service::AuthService, booking_service::BookingService, reconciler::Reconciler,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared state handed to every handler through `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub auth: AuthService,
    pub bookings: BookingService,
    pub reconciler: Reconciler,
    /// Mark session cookies `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, secure_cookies: bool) -> Self {
        Self {
            auth: AuthService::new(db.clone()),
            bookings: BookingService::new(db.clone()),
            reconciler: Reconciler::new(db.clone()),
            db,
            secure_cookies,
        }
    }
}
