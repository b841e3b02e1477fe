//! Registration, login and logout.

use crate::{
    errors::AppError,
    services,
    session::{
        AuthUser, Flash, IncomingFlash, MaybeUser, clear_session_cookie, redirect_with_flash,
        session_cookie, session_token,
    },
    state::AppState,
    views,
};
use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

/// Body of the register and login forms.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `GET /register`
pub async fn register_page(
    MaybeUser(user): MaybeUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    views::page(
        "Register",
        user.as_ref(),
        flash.as_ref(),
        &views::credentials_form("/register", "Register"),
    )
}

/// `POST /register`: create the account, then send the user home.
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    state
        .auth
        .register(&form.email, &form.password, services::now())
        .await?;
    Ok(redirect_with_flash("/", Flash::success("Registration successful!")))
}

/// `GET /login`
pub async fn login_page(
    MaybeUser(user): MaybeUser,
    IncomingFlash(flash): IncomingFlash,
) -> Response {
    views::page(
        "Log in",
        user.as_ref(),
        flash.as_ref(),
        &views::credentials_form("/login", "Log in"),
    )
}

/// `POST /login`: verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let user = state.auth.authenticate(&form.email, &form.password).await?;
    let session = state.auth.create_session(&user, services::now()).await?;

    Ok((
        AppendHeaders([
            (
                header::SET_COOKIE,
                session_cookie(session.token, state.secure_cookies),
            ),
            (
                header::SET_COOKIE,
                Flash::success("You are now logged in!").to_cookie(),
            ),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}

/// `GET /logout`: drop the session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = session_token(&headers) {
        state.auth.end_session(token).await?;
    }

    Ok((
        AppendHeaders([
            (
                header::SET_COOKIE,
                clear_session_cookie(state.secure_cookies),
            ),
            (
                header::SET_COOKIE,
                Flash::info("You have been logged out.").to_cookie(),
            ),
        ]),
        Redirect::to("/login"),
    )
        .into_response())
}
