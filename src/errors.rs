use crate::{
    services::{auth_service::AuthError, booking_service::BookingError},
    session::{Flash, redirect_with_flash},
    views,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

/// Error surfaced at the HTTP boundary.
///
/// With a `redirect` target it becomes a flash notice plus a 303 to that
/// page; without one it renders an error page with `status`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub redirect: Option<String>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            redirect: None,
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 422 on a malformed form.
    pub fn bad_form(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
    }

    /// Report the error as a notice on `to` instead of an error page.
    pub fn redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.redirect {
            Some(to) => redirect_with_flash(&to, Flash::danger(self.message)),
            None => (self.status, views::error_page(self.status, &self.message)).into_response(),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidInterval => AppError::bad_form("End time must be after start time.")
                .redirect("/book"),
            BookingError::TimeOutOfRange => {
                AppError::bad_form("Booking times must fall within the years 0000 to 9999.")
                    .redirect("/book")
            }
            BookingError::LockerUnavailable(number) => AppError::new(
                StatusCode::CONFLICT,
                format!("Locker {} is already taken for the selected time.", number),
            )
            .redirect("/book"),
            BookingError::LockerNotFound(_) => {
                AppError::bad_form("Please choose a locker from the list.").redirect("/book")
            }
            BookingError::NotFound(id) => AppError::not_found(format!("Booking {} not found.", id)),
            BookingError::Forbidden(_) => {
                AppError::new(StatusCode::FORBIDDEN, "You cannot modify this booking.")
                    .redirect("/profile")
            }
            BookingError::Sqlx(err) => {
                tracing::error!("database error: {}", err);
                AppError::internal("Internal server error")
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(_) | AuthError::PasswordTooShort => {
                AppError::bad_form(err.to_string()).redirect("/register")
            }
            AuthError::DuplicateEmail(_) => {
                AppError::new(StatusCode::CONFLICT, err.to_string()).redirect("/register")
            }
            AuthError::InvalidCredentials => {
                AppError::new(StatusCode::UNAUTHORIZED, "Invalid email or password.")
                    .redirect("/login")
            }
            AuthError::Hash(msg) => {
                tracing::error!("password hashing failed: {}", msg);
                AppError::internal("Internal server error")
            }
            AuthError::Sqlx(err) => {
                tracing::error!("database error: {}", err);
                AppError::internal("Internal server error")
            }
        }
    }
}
