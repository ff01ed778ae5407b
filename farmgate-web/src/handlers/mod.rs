//! HTTP request handlers for the Farmgate web server
//!
//! Handlers are grouped by the role that uses them. Anything behind a role
//! takes the matching gate extractor from [`crate::auth`] as its first argument.

pub mod admin;
pub mod buyer;
pub mod cart;
pub mod farmer;
pub mod health;
pub mod product;
pub mod types;

pub use health::*;

use crate::{
    auth::MaybePrincipal,
    error::{ApiError, ApiResult},
    session::{removal_cookie, session_cookie, SESSION_COOKIE},
    AppState,
};
use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use farmgate_core::Role;
use serde_json::{json, Value};
use tracing::info;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

/// Reject the first blank field by name
pub(crate) fn require_fields(fields: &[(&str, &str)]) -> ApiResult<()> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(ApiError::BadRequest(format!("{} is required", name))),
        None => Ok(()),
    }
}

pub(crate) fn check_new_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Create a session for the account and add its cookie to `jar`
pub(crate) async fn start_session(
    state: &AppState,
    jar: CookieJar,
    subject_id: i64,
    role: Role,
) -> ApiResult<CookieJar> {
    let issued = state.sessions.create(subject_id, role).await?;
    info!("🔑 {} {} logged in", role, subject_id);
    Ok(jar.add(session_cookie(&issued, &state.config.session)))
}

/// Log out whoever holds the cookie, if anyone
///
/// Always succeeds for the client and always clears the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<(CookieJar, Json<Value>)> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value()).await?;
    }
    let jar = jar.add(removal_cookie(&state.config.session));

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Logged out",
        })),
    ))
}

/// Who the session cookie belongs to, if anyone
pub async fn session_info(MaybePrincipal(principal): MaybePrincipal) -> Json<Value> {
    match principal {
        Some(principal) => Json(json!({
            "authenticated": true,
            "id": principal.id(),
            "email": principal.email(),
            "role": principal.role(),
        })),
        None => Json(json!({ "authenticated": false })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_fields_names_first_blank() {
        assert!(require_fields(&[("email", "a@b.c"), ("password", "x")]).is_ok());
        let err = require_fields(&[("email", "a@b.c"), ("first_name", "  "), ("last_name", "")])
            .unwrap_err();
        assert_eq!(err.to_string(), "first_name is required");
    }

    #[test]
    fn test_password_length() {
        assert!(check_new_password("1234567").is_err());
        assert!(check_new_password("12345678").is_ok());
    }
}
