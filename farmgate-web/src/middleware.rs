//! Session authentication middleware

use crate::{
    auth::Principal,
    session::{SessionError, SessionSubject, SESSION_COOKIE},
    ApiError, AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use farmgate_core::Role;
use tracing::{debug, error};

/// Fetch the account a session points at
pub async fn load_principal(
    state: &AppState,
    subject: SessionSubject,
) -> Result<Option<Principal>, sqlx::Error> {
    let principal = match subject.role {
        Role::Admin => state
            .admins
            .find_by_id(subject.subject_id)
            .await?
            .map(Principal::Admin),
        Role::Farmer => state
            .farmers
            .find_by_id(subject.subject_id)
            .await?
            .map(Principal::Farmer),
        Role::Buyer => state
            .buyers
            .find_by_id(subject.subject_id)
            .await?
            .map(Principal::Buyer),
    };
    Ok(principal)
}

/// Attach the session's [`Principal`] to the request, if there is one
///
/// A missing, unknown or expired session lets the request through
/// unauthenticated; the role gates decide whether that is acceptable.
/// A session that cannot be read, or that points at an account that no
/// longer exists, aborts the request with 500.
pub async fn authenticate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_owned()) else {
        debug!("No session cookie, continuing unauthenticated");
        return Ok(next.run(request).await);
    };

    let subject = match state.sessions.resolve(&token).await {
        Ok(subject) => subject,
        Err(SessionError::NotFound) | Err(SessionError::Expired) => {
            debug!("Session not usable, continuing unauthenticated");
            return Ok(next.run(request).await);
        }
        Err(e) => {
            error!("Failed to resolve session: {}", e);
            return Err(ApiError::Internal);
        }
    };

    let principal = load_principal(&state, subject)
        .await?
        .ok_or_else(|| {
            error!(
                "Session references missing {} {}",
                subject.role, subject.subject_id
            );
            ApiError::Internal
        })?;

    debug!("Authenticated {} {}", principal.role(), principal.id());
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
