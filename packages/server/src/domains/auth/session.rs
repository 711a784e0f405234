//! Session cookie relay.
//!
//! The token pair issued by the provider travels in two HttpOnly cookies.
//! This module reads them off inbound requests and writes refreshed pairs
//! onto responses with the attributes decided by [`CookiePolicy`].

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use cookie::Cookie;

use crate::common::cookies::CookiePolicy;
use crate::domains::auth::provider::ProviderSession;

pub const ACCESS_COOKIE: &str = "sb-access-token";
pub const REFRESH_COOKIE: &str = "sb-refresh-token";

/// Refresh tokens outlive the access token; keep the cookie for 30 days.
const REFRESH_MAX_AGE_DAYS: i64 = 30;

/// Token pair read from request cookies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Read the session token pair from the `Cookie` header, if present.
pub fn read_session_cookies(headers: &HeaderMap) -> Option<SessionTokens> {
    let header = headers.get(COOKIE)?.to_str().ok()?;

    let mut access_token = None;
    let mut refresh_token = None;
    for cookie in Cookie::split_parse(header.to_string()).flatten() {
        match cookie.name() {
            ACCESS_COOKIE => access_token = Some(cookie.value().to_string()),
            REFRESH_COOKIE => refresh_token = Some(cookie.value().to_string()),
            _ => {}
        }
    }

    access_token.map(|access_token| SessionTokens {
        access_token,
        refresh_token,
    })
}

fn build_cookie(name: &str, value: String, max_age_seconds: i64, policy: &CookiePolicy) -> String {
    let mut builder = Cookie::build((name.to_string(), value))
        .path("/")
        .http_only(true)
        .secure(policy.secure)
        .same_site(policy.same_site)
        .max_age(cookie::time::Duration::seconds(max_age_seconds));
    if let Some(domain) = &policy.domain {
        builder = builder.domain(domain.clone());
    }
    builder.build().to_string()
}

/// Serialize the session into its two cookies.
pub fn session_cookies(session: &ProviderSession, policy: &CookiePolicy) -> Vec<String> {
    vec![
        build_cookie(
            ACCESS_COOKIE,
            session.access_token.clone(),
            session.expires_in,
            policy,
        ),
        build_cookie(
            REFRESH_COOKIE,
            session.refresh_token.clone(),
            REFRESH_MAX_AGE_DAYS * 24 * 60 * 60,
            policy,
        ),
    ]
}

/// Append `Set-Cookie` headers carrying the session to a response.
pub fn append_session_cookies(
    headers: &mut HeaderMap,
    session: &ProviderSession,
    policy: &CookiePolicy,
) {
    for cookie in session_cookies(session, policy) {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.append(SET_COOKIE, value);
        }
    }
}
