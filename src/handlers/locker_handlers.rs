//! Public pages: greeting and locker status.

use crate::{
    errors::AppError,
    services,
    session::{IncomingFlash, MaybeUser},
    state::AppState,
    views,
};
use axum::{extract::State, response::Response};

/// `GET /`: greeting that reflects the login state.
pub async fn home(MaybeUser(user): MaybeUser, IncomingFlash(flash): IncomingFlash) -> Response {
    views::page(
        "Locker booking",
        user.as_ref(),
        flash.as_ref(),
        &views::home(user.as_ref()),
    )
}

/// `GET /lockers`: every locker with its current occupancy.
pub async fn list_lockers(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, AppError> {
    let statuses = state.bookings.list_locker_status(services::now()).await?;
    Ok(views::page(
        "Lockers",
        user.as_ref(),
        flash.as_ref(),
        &views::locker_status(&statuses),
    ))
}
