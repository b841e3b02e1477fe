//! Server-rendered HTML pages.
//!
//! Pages are small enough to build with `format!`; every interpolated value
//! goes through [`html_escape`].

use crate::{
    models::{
        booking::{BookingPartition, BookingView},
        locker::{Locker, LockerStatus},
        user::User,
    },
    session::Flash,
};
use axum::{
    http::{StatusCode, header},
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use chrono::{DateTime, Utc};

/// Format sent by `<input type="datetime-local">`.
pub const FORM_DATETIME: &str = "%Y-%m-%dT%H:%M";
const DISPLAY_DATETIME: &str = "%Y-%m-%d %H:%M";

/// Wrap `body` in the site layout. A shown flash notice is cleared.
pub fn page(title: &str, user: Option<&User>, flash: Option<&Flash>, body: &str) -> Response {
    let nav = match user {
        Some(u) => format!(
            r#"<a href="/book">Book</a> | <a href="/profile">My bookings</a> | <a href="/lockers">Lockers</a> | {} <a href="/logout">[Log out]</a>"#,
            html_escape(&u.email)
        ),
        None => r#"<a href="/lockers">Lockers</a> | <a href="/login">Log in</a> | <a href="/register">Register</a>"#
            .to_string(),
    };
    let notice = flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                html_escape(&f.message)
            )
        })
        .unwrap_or_default();

    let html = format!(
        concat!(
            "<!DOCTYPE html>",
            r#"<html><head><meta charset="utf-8"><title>{title}</title></head>"#,
            "<body><nav>{nav}</nav>{notice}<main><h1>{title}</h1>{body}</main></body></html>"
        ),
        title = html_escape(title),
        nav = nav,
        notice = notice,
        body = body,
    );

    if flash.is_some() {
        (
            AppendHeaders([(header::SET_COOKIE, Flash::clear_cookie())]),
            Html(html),
        )
            .into_response()
    } else {
        Html(html).into_response()
    }
}

pub fn home(user: Option<&User>) -> String {
    match user {
        Some(u) => format!(
            r#"<p>You are logged in as: {} <a href="/logout">[Log out]</a></p>"#,
            html_escape(&u.email)
        ),
        None => r#"<p>Hello! Please <a href="/login">log in</a>.</p>"#.to_string(),
    }
}

/// Email + password form posting to `action`.
pub fn credentials_form(action: &str, submit: &str) -> String {
    format!(
        concat!(
            r#"<form method="post" action="{action}">"#,
            r#"<label>Email <input type="email" name="email" required></label>"#,
            r#"<label>Password <input type="password" name="password" required></label>"#,
            r#"<button type="submit">{submit}</button>"#,
            "</form>"
        ),
        action = html_escape(action),
        submit = html_escape(submit),
    )
}

pub fn booking_form(lockers: &[Locker]) -> String {
    if lockers.is_empty() {
        return "<p>All lockers are occupied right now.</p>".to_string();
    }
    let options: String = lockers
        .iter()
        .map(|l| {
            format!(
                r#"<option value="{}">{}</option>"#,
                l.id,
                html_escape(&l.number)
            )
        })
        .collect();
    format!(
        concat!(
            r#"<form method="post" action="/book">"#,
            r#"<label>Locker <select name="locker">{options}</select></label>"#,
            r#"<label>Start <input type="datetime-local" name="start_time" required></label>"#,
            r#"<label>End <input type="datetime-local" name="end_time" required></label>"#,
            r#"<button type="submit">Book</button>"#,
            "</form><p>Times are UTC.</p>"
        ),
        options = options
    )
}

pub fn profile(bookings: &BookingPartition) -> String {
    let mut html = String::new();
    for (heading, rows, actions) in [
        ("Current bookings", &bookings.current, true),
        ("Upcoming bookings", &bookings.future, true),
        ("Past bookings", &bookings.past, false),
    ] {
        html.push_str(&format!("<h2>{}</h2>", heading));
        if rows.is_empty() {
            html.push_str("<p>None.</p>");
            continue;
        }
        html.push_str("<ul>");
        for b in rows {
            html.push_str(&booking_row(b, actions));
        }
        html.push_str("</ul>");
    }
    html
}

fn booking_row(b: &BookingView, actions: bool) -> String {
    let mut row = format!(
        "<li>{} &mdash; {} to {} ({})",
        html_escape(&b.locker_number),
        display_time(b.start_time),
        display_time(b.end_time),
        if b.is_paid { "paid" } else { "not paid" }
    );
    if actions {
        if !b.is_paid {
            row.push_str(&format!(
                r#" <form method="post" action="/pay/{}"><button type="submit">Pay</button></form>"#,
                b.id
            ));
        }
        row.push_str(&format!(
            r#" <form method="post" action="/cancel/{}"><button type="submit">Cancel</button></form>"#,
            b.id
        ));
    }
    row.push_str("</li>");
    row
}

pub fn locker_status(statuses: &[LockerStatus]) -> String {
    statuses
        .iter()
        .map(|s| format!("{} &mdash; {}", html_escape(&s.number), s.occupancy.label()))
        .collect::<Vec<_>>()
        .join("<br>")
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    Html(format!(
        concat!(
            "<!DOCTYPE html>",
            r#"<html><head><meta charset="utf-8"><title>{code}</title></head>"#,
            r#"<body><h1>{code} {reason}</h1><p>{message}</p><p><a href="/">Home</a></p></body></html>"#
        ),
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or(""),
        message = html_escape(message),
    ))
}

fn display_time(t: DateTime<Utc>) -> String {
    t.format(DISPLAY_DATETIME).to_string()
}

pub fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
