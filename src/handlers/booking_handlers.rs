//! Booking pages and actions for logged-in users.

use crate::{
    errors::AppError,
    services::{
        self,
        booking_service::{self, BookingError, NewBooking, PayOutcome},
    },
    session::{AuthUser, Flash, IncomingFlash, redirect_with_flash},
    state::AppState,
    views,
};
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Body of the booking form. Times come from `datetime-local` inputs.
#[derive(Debug, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub locker: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

impl BookingForm {
    fn into_request(self) -> Result<NewBooking, AppError> {
        let locker_id = Uuid::parse_str(self.locker.trim()).map_err(|_| {
            AppError::bad_form("Please choose a locker from the list.").redirect("/book")
        })?;
        let start = parse_form_time(&self.start_time)
            .ok_or_else(|| AppError::bad_form("Invalid start time.").redirect("/book"))?;
        let end = parse_form_time(&self.end_time)
            .ok_or_else(|| AppError::bad_form("Invalid end time.").redirect("/book"))?;
        Ok(NewBooking {
            locker_id,
            start,
            end,
        })
    }
}

/// Parse a `datetime-local` value as UTC. Seconds are optional.
///
/// Years outside 0000-9999 are refused; `%Y` would otherwise accept
/// signed and five-digit years.
pub fn parse_form_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, views::FORM_DATETIME)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(|naive| naive.and_utc())
        .filter(|t| booking_service::is_storable(*t))
}

/// `GET /book`: form listing the lockers free right now.
pub async fn booking_page(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, AppError> {
    let lockers = state.bookings.offerable_lockers(services::now()).await?;
    Ok(views::page(
        "Book a locker",
        Some(&user),
        flash.as_ref(),
        &views::booking_form(&lockers),
    ))
}

/// `POST /book`
pub async fn create_booking(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Form(form): Form<BookingForm>,
) -> Result<Response, AppError> {
    let request = form.into_request()?;
    state
        .bookings
        .create_booking(user.id, request, services::now())
        .await?;
    Ok(redirect_with_flash(
        "/",
        Flash::success("Booking created successfully!"),
    ))
}

/// `GET /profile`: the user's bookings split into current, upcoming and past.
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    IncomingFlash(flash): IncomingFlash,
) -> Result<Response, AppError> {
    let bookings = state
        .bookings
        .list_bookings_for_user(user.id, services::now())
        .await?;
    Ok(views::page(
        "My bookings",
        Some(&user),
        flash.as_ref(),
        &views::profile(&bookings),
    ))
}

/// `POST /pay/{booking_id}`
pub async fn pay_booking(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let outcome = state
        .bookings
        .pay_booking(booking_id, user.id)
        .await
        .map_err(|err| forbidden_as(err, "You cannot pay for this booking."))?;

    let flash = match outcome {
        PayOutcome::Paid => Flash::success("Booking paid successfully."),
        PayOutcome::AlreadyPaid => Flash::info("This booking is already paid."),
    };
    Ok(redirect_with_flash("/profile", flash))
}

/// `POST /cancel/{booking_id}`
pub async fn cancel_booking(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state
        .bookings
        .cancel_booking(booking_id, user.id, services::now())
        .await
        .map_err(|err| forbidden_as(err, "You cannot cancel this booking."))?;
    Ok(redirect_with_flash("/profile", Flash::info("Booking cancelled.")))
}

fn forbidden_as(err: BookingError, message: &str) -> AppError {
    match err {
        BookingError::Forbidden(_) => {
            AppError::new(StatusCode::FORBIDDEN, message).redirect("/profile")
        }
        other => other.into(),
    }
}
