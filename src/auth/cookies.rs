use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::config::{self, CookieSameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

pub fn access_token_cookie(token: &str) -> Cookie<'static> {
    let ttl_hours = config::config().security.access_token_ttl_hours;
    session_cookie(ACCESS_TOKEN_COOKIE, token, Duration::hours(ttl_hours))
}

pub fn refresh_token_cookie(token: &str) -> Cookie<'static> {
    let ttl_days = config::config().security.refresh_token_ttl_days;
    session_cookie(REFRESH_TOKEN_COOKIE, token, Duration::days(ttl_days))
}

/// Counterpart for `CookieJar::remove`: the name and path must match the
/// cookie being cleared.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

fn session_cookie(name: &'static str, token: &str, max_age: Duration) -> Cookie<'static> {
    let security = &config::config().security;
    Cookie::build((name, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(security.cookie_secure)
        .same_site(same_site(security.cookie_same_site))
        .max_age(max_age)
        .build()
}

fn same_site(policy: CookieSameSite) -> SameSite {
    match policy {
        CookieSameSite::Strict => SameSite::Strict,
        CookieSameSite::Lax => SameSite::Lax,
        CookieSameSite::None => SameSite::None,
    }
}
