//! Middleware running the availability reconciler before every request.

use crate::{services, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error};

/// Reconcile locker availability, then serve the request.
///
/// A failed pass is logged and the request is still served; the next
/// request retries.
pub async fn reconcile_before_request(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match state.reconciler.run(services::now()).await {
        Ok(report) if !report.is_noop() => debug!(
            purged = report.purged,
            released = report.released,
            occupied = report.occupied,
            "reconciled locker availability"
        ),
        Ok(_) => {}
        Err(err) => error!("availability reconcile failed: {}", err),
    }
    next.run(req).await
}
