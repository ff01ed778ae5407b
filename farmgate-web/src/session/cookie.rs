use super::store::IssuedSession;
use axum_extra::extract::cookie::{Cookie, SameSite};
use farmgate_core::{SameSitePolicy, SessionConfig};
use time::OffsetDateTime;

pub const SESSION_COOKIE: &str = "session_id";

fn same_site(policy: SameSitePolicy) -> SameSite {
    match policy {
        SameSitePolicy::Strict => SameSite::Strict,
        SameSitePolicy::Lax => SameSite::Lax,
        SameSitePolicy::None => SameSite::None,
    }
}

/// Cookie carrying `issued.token`, expiring together with the session row
pub fn session_cookie(issued: &IssuedSession, config: &SessionConfig) -> Cookie<'static> {
    let builder = Cookie::build((SESSION_COOKIE, issued.token.clone()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure())
        .same_site(same_site(config.same_site));

    let builder = match OffsetDateTime::from_unix_timestamp(issued.expires_at.timestamp()) {
        Ok(expires) => builder.expires(expires),
        Err(_) => builder.max_age(time::Duration::hours(config.ttl_hours)),
    };

    builder.build()
}

/// Cookie that makes the browser drop the session cookie
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure())
        .same_site(same_site(config.same_site))
        .build();
    cookie.make_removal();
    cookie
}
