//! Cookie plumbing shared by the middleware stages.

use std::time::Duration;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use cookie::Cookie;

use crate::auth::oauth::StateNonce;
use crate::auth::session_token::app_cookie;
use crate::config::AppConfig;

/// Name of the cookie holding the install state nonce.
pub const STATE_COOKIE: &str = "state";

/// Returns every value sent for cookie `name`, in header order.
pub(crate) fn cookie_values(headers: &HeaderMap, name: &str) -> Vec<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .filter(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
        .collect()
}

/// Appends a `Set-Cookie` header to `response`.
pub(crate) fn append_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(error) => {
            tracing::warn!(cookie = cookie.name(), %error, "dropping unrepresentable cookie");
        }
    }
}

/// The short-lived cookie set before the install redirect.
pub(crate) fn state_cookie(config: &AppConfig, state: &StateNonce) -> Cookie<'static> {
    app_cookie(
        config,
        STATE_COOKIE,
        state.as_ref().to_string(),
        config.state_cookie_max_age(),
    )
}

/// A cookie that deletes the state cookie.
pub(crate) fn expired_state_cookie(config: &AppConfig) -> Cookie<'static> {
    let mut cookie = app_cookie(config, STATE_COOKIE, String::new(), Duration::ZERO);
    cookie.make_removal();
    cookie
}
