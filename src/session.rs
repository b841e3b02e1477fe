//! Session cookie handling, flash notices and the request-scoped user
//! extractors.
//!
//! - [`SESSION_COOKIE`] holds the random token of a row in `sessions`.
//! - [`FLASH_COOKIE`] carries one notice to the next rendered page; the
//!   page clears it.
//! - [`MaybeUser`] resolves the session if there is one, [`AuthUser`]
//!   redirects anonymous requests to `/login`.

use crate::{
    errors::AppError,
    models::user::User,
    services::{self, auth_service::SESSION_TTL_DAYS},
    state::AppState,
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use cookie::{Cookie, SameSite};
use std::convert::Infallible;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "locker_session";
pub const FLASH_COOKIE: &str = "locker_flash";

/// Value of the cookie `name` from the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for part in raw.split(';') {
            if let Ok(parsed) = Cookie::parse(part.trim().to_string()) {
                if parsed.name() == name {
                    return Some(parsed.value().to_string());
                }
            }
        }
    }
    None
}

pub fn session_token(headers: &HeaderMap) -> Option<Uuid> {
    cookie_value(headers, SESSION_COOKIE).and_then(|v| Uuid::parse_str(&v).ok())
}

/// `Set-Cookie` value establishing a session. The cookie lives as long as
/// the server-side row.
pub fn session_cookie(token: Uuid, secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::days(SESSION_TTL_DAYS))
        .build()
        .to_string()
}

/// `Set-Cookie` value removing the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(cookie::time::Duration::ZERO)
        .build()
        .to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Danger => "danger",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            "danger" => Some(FlashLevel::Danger),
            _ => None,
        }
    }
}

/// A one-shot notice shown on the next page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Danger, message)
    }

    /// Cookie-safe encoding: base64url of `level|message`.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}|{}", self.level.as_str(), self.message))
    }

    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let (level, message) = text.split_once('|')?;
        Some(Self::new(FlashLevel::parse(level)?, message))
    }

    pub fn to_cookie(&self) -> String {
        Cookie::build((FLASH_COOKIE, self.encode()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
            .to_string()
    }

    pub fn clear_cookie() -> String {
        Cookie::build((FLASH_COOKIE, ""))
            .path("/")
            .max_age(cookie::time::Duration::ZERO)
            .build()
            .to_string()
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        cookie_value(headers, FLASH_COOKIE).and_then(|v| Self::decode(&v))
    }
}

/// 303 redirect to `to` carrying a flash notice.
pub fn redirect_with_flash(to: &str, flash: Flash) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, flash.to_cookie())]),
        Redirect::to(to),
    )
        .into_response()
}

/// The flash notice sent with this request, if any.
pub struct IncomingFlash(pub Option<Flash>);

impl<S: Send + Sync> FromRequestParts<S> for IncomingFlash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(IncomingFlash(Flash::from_headers(&parts.headers)))
    }
}

/// The logged-in user, or `None` for anonymous requests.
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(MaybeUser(None));
        };
        let user = state.auth.resolve_session(token, services::now()).await?;
        Ok(MaybeUser(user))
    }
}

/// The logged-in user; anonymous requests are sent to `/login`.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await {
            Ok(MaybeUser(Some(user))) => Ok(AuthUser(user)),
            Ok(MaybeUser(None)) => Err(redirect_with_flash(
                "/login",
                Flash::info("Please log in to access this page."),
            )),
            Err(err) => Err(err.into_response()),
        }
    }
}
