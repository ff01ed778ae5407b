//! Tests for the role gate extractors

use super::*;
use crate::models::FarmerStatus;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Method, Request},
};
use chrono::Utc;

/// Helper function to create request parts carrying an optional principal
fn create_test_parts(principal: Option<Principal>) -> Parts {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/test")
        .body(Body::empty())
        .unwrap();

    let (mut parts, _) = request.into_parts();
    if let Some(principal) = principal {
        parts.extensions.insert(principal);
    }
    parts
}

fn admin() -> Principal {
    Principal::Admin(Admin {
        id: 1,
        email: "root@farmgate.test".to_string(),
        password_hash: String::new(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    })
}

fn farmer() -> Principal {
    Principal::Farmer(Farmer {
        id: 42,
        email: "ada@farm.test".to_string(),
        password_hash: String::new(),
        first_name: "Ada".to_string(),
        last_name: "Okafor".to_string(),
        farm_name: "Green Acre".to_string(),
        farm_size: "12 acres".to_string(),
        location: "Nakuru".to_string(),
        status: FarmerStatus::Approved,
        rejection_reason: None,
        approved_at: Some(Utc::now()),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    })
}

fn buyer() -> Principal {
    Principal::Buyer(Buyer {
        id: 7,
        email: "w@buy.test".to_string(),
        password_hash: String::new(),
        first_name: "Wanjiru".to_string(),
        last_name: "Mwangi".to_string(),
        delivery_address: "12 Market Rd".to_string(),
        delivery_preferences: None,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    })
}

#[tokio::test]
async fn test_anonymous_request_is_denied_by_every_gate() {
    let mut parts = create_test_parts(None);

    let denied = AdminOnly::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(denied.required, Role::Admin);
    assert_eq!(denied.actual, None);
    assert!(FarmerOnly::from_request_parts(&mut parts, &()).await.is_err());
    assert!(BuyerOnly::from_request_parts(&mut parts, &()).await.is_err());
}

#[tokio::test]
async fn test_farmer_passes_only_the_farmer_gate() {
    let mut parts = create_test_parts(Some(farmer()));

    let FarmerOnly(farmer) = FarmerOnly::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(farmer.id, 42);

    let denied = AdminOnly::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(denied.actual, Some(Role::Farmer));
    assert!(BuyerOnly::from_request_parts(&mut parts, &()).await.is_err());
}

#[tokio::test]
async fn test_each_role_has_exactly_one_gate() {
    for principal in [admin(), farmer(), buyer()] {
        let role = principal.role();
        let mut parts = create_test_parts(Some(principal));

        let admitted = [
            AdminOnly::from_request_parts(&mut parts, &()).await.is_ok(),
            FarmerOnly::from_request_parts(&mut parts, &()).await.is_ok(),
            BuyerOnly::from_request_parts(&mut parts, &()).await.is_ok(),
        ];
        let expected = [
            role == Role::Admin,
            role == Role::Farmer,
            role == Role::Buyer,
        ];
        assert_eq!(admitted, expected, "gates for {}", role);
    }
}

#[tokio::test]
async fn test_maybe_principal_never_rejects() {
    let mut parts = create_test_parts(None);
    let MaybePrincipal(principal) = MaybePrincipal::from_request_parts(&mut parts, &())
        .await
        .unwrap();
    assert!(principal.is_none());

    let mut parts = create_test_parts(Some(buyer()));
    let MaybePrincipal(principal) = MaybePrincipal::from_request_parts(&mut parts, &())
        .await
        .unwrap();
    let principal = principal.unwrap();
    assert_eq!(principal.role(), Role::Buyer);
    assert_eq!(principal.email(), "w@buy.test");
}

#[tokio::test]
async fn test_denial_body_names_required_role() {
    let mut parts = create_test_parts(Some(buyer()));
    let response = AdminOnly::from_request_parts(&mut parts, &())
        .await
        .unwrap_err()
        .into_response();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "role_denied");
    assert_eq!(json["required_role"], "admin");
    assert_eq!(json["message"], "Access denied: admin privileges required");
}
