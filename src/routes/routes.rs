//! Defines routes for the locker booking site.
//!
//! ## Structure
//! - **Public pages**
//!   - `GET  /`: greeting with login state
//!   - `GET  /lockers`: locker occupancy listing
//!   - `GET  /register`, `POST /register`: create an account
//!   - `GET  /login`, `POST /login`: start a session
//!
//! - **Session-authenticated**
//!   - `GET  /logout`: end the session
//!   - `GET  /book`, `POST /book`: offerable lockers and booking form
//!   - `GET  /profile`: current / upcoming / past bookings
//!   - `POST /pay/{booking_id}`: mark a booking paid
//!   - `POST /cancel/{booking_id}`: cancel a booking
//!
//! - **Probes**: `GET /healthz`, `GET /readyz`
//!
//! Every request first passes through the availability reconciler.

use crate::{
    handlers::{
        auth_handlers::{login, login_page, logout, register, register_page},
        booking_handlers::{booking_page, cancel_booking, create_booking, pay_booking, profile},
        health_handlers::{healthz, readyz},
        locker_handlers::{home, list_lockers},
        reconcile_before_request,
    },
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build and return the router for all pages.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // public pages
        .route("/", get(home))
        .route("/lockers", get(list_lockers))
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        // authenticated pages
        .route("/logout", get(logout))
        .route("/book", get(booking_page).post(create_booking))
        .route("/profile", get(profile))
        .route("/pay/{booking_id}", post(pay_booking))
        .route("/cancel/{booking_id}", post(cancel_booking))
}

/// The complete application: routes, reconcile middleware, request tracing
/// and state.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            reconcile_before_request,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
