//! Session cookie construction for the login and logout routes.

use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::Cookie;

use crate::{app_error::AppError, infra::config::CookieSettings};

/// Appends a cookie to the headers, handling parse errors gracefully
pub(crate) fn append_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) -> Result<(), AppError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|_| AppError::Internal("Failed to build cookie header".into()))?;
    headers.append("set-cookie", value);
    Ok(())
}

pub(crate) fn session_cookie(
    name: &'static str,
    token: String,
    max_age: time::Duration,
    settings: &CookieSettings,
) -> Cookie<'static> {
    let mut builder = Cookie::build((name, token))
        .http_only(true)
        .secure(settings.secure)
        .same_site(settings.same_site)
        .path("/")
        .max_age(max_age);
    if let Some(domain) = &settings.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build()
}

/// Expired, empty cookie with the same attributes so browsers drop it.
pub(crate) fn clear_session_cookie(
    headers: &mut HeaderMap,
    name: &'static str,
    settings: &CookieSettings,
) -> Result<(), AppError> {
    append_cookie(
        headers,
        session_cookie(name, String::new(), time::Duration::seconds(0), settings),
    )
}
