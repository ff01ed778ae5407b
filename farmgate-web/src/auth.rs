//! Authenticated principals and role gates
//!
//! [`crate::middleware::authenticate`] turns the session cookie into a
//! [`Principal`] stored in the request extensions. Handlers then ask for the
//! role they need through one of the gate extractors:
//!
//! - [`AdminOnly`], [`FarmerOnly`], [`BuyerOnly`] reject everything except a
//!   principal of exactly that role with `403 Forbidden`;
//! - [`MaybePrincipal`] never rejects.

pub mod password;

#[cfg(test)]
mod tests;

use crate::models::{Admin, Buyer, Farmer};
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use farmgate_core::Role;
use std::convert::Infallible;
use tracing::warn;

/// The account behind an authenticated request
#[derive(Debug, Clone)]
pub enum Principal {
    Admin(Admin),
    Farmer(Farmer),
    Buyer(Buyer),
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Admin(_) => Role::Admin,
            Principal::Farmer(_) => Role::Farmer,
            Principal::Buyer(_) => Role::Buyer,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Principal::Admin(admin) => admin.id,
            Principal::Farmer(farmer) => farmer.id,
            Principal::Buyer(buyer) => buyer.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Admin(admin) => &admin.email,
            Principal::Farmer(farmer) => &farmer.email,
            Principal::Buyer(buyer) => &buyer.email,
        }
    }
}

/// Rejection for a request that lacks the role a handler requires
#[derive(Debug)]
pub struct RoleDenied {
    pub required: Role,
    pub actual: Option<Role>,
}

impl RoleDenied {
    fn new(required: Role, actual: Option<&Principal>) -> Self {
        let denied = Self {
            required,
            actual: actual.map(Principal::role),
        };
        match actual {
            Some(principal) => warn!(
                "Role gate denied {} {} (requires {})",
                principal.role(),
                principal.id(),
                required
            ),
            None => warn!("Role gate denied anonymous request (requires {})", required),
        }
        denied
    }
}

impl IntoResponse for RoleDenied {
    fn into_response(self) -> Response {
        (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "success": false,
                "error": "role_denied",
                "message": format!("Access denied: {} privileges required", self.required),
                "required_role": self.required,
            })),
        )
            .into_response()
    }
}

fn principal_of(parts: &Parts) -> Option<&Principal> {
    parts.extensions.get::<Principal>()
}

/// Requires an admin session
#[derive(Debug, Clone)]
pub struct AdminOnly(pub Admin);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = RoleDenied;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal_of(parts) {
            Some(Principal::Admin(admin)) => Ok(AdminOnly(admin.clone())),
            other => Err(RoleDenied::new(Role::Admin, other)),
        }
    }
}

/// Requires a farmer session
#[derive(Debug, Clone)]
pub struct FarmerOnly(pub Farmer);

impl<S> FromRequestParts<S> for FarmerOnly
where
    S: Send + Sync,
{
    type Rejection = RoleDenied;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal_of(parts) {
            Some(Principal::Farmer(farmer)) => Ok(FarmerOnly(farmer.clone())),
            other => Err(RoleDenied::new(Role::Farmer, other)),
        }
    }
}

/// Requires a buyer session
#[derive(Debug, Clone)]
pub struct BuyerOnly(pub Buyer);

impl<S> FromRequestParts<S> for BuyerOnly
where
    S: Send + Sync,
{
    type Rejection = RoleDenied;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match principal_of(parts) {
            Some(Principal::Buyer(buyer)) => Ok(BuyerOnly(buyer.clone())),
            other => Err(RoleDenied::new(Role::Buyer, other)),
        }
    }
}

/// Principal extractor for handlers that serve anonymous requests too
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(principal_of(parts).cloned()))
    }
}
