//! HTTP handlers. Each one resolves the request-scoped user through the
//! session extractors and delegates to the services on `AppState`.

pub mod auth_handlers;
pub mod booking_handlers;
pub mod health_handlers;
pub mod locker_handlers;
pub mod reconcile;

pub use reconcile::reconcile_before_request;
