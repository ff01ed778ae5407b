//! Buyer accounts and the product catalogue

use super::types::{BuyerRegisterRequest, CatalogParams, LoginRequest};
use super::{check_new_password, require_fields, start_session};
use crate::{
    auth::{
        password::{hash_password_blocking, verify_login},
        BuyerOnly,
    },
    error::{ApiError, ApiJson, ApiResult},
    models::{normalize_email, NewBuyer, Product, ProductPage},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use farmgate_core::{CatalogQuery, Role};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BuyerRegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_fields(&[
        ("email", request.email.as_str()),
        ("password", request.password.as_str()),
        ("first_name", request.first_name.as_str()),
        ("last_name", request.last_name.as_str()),
        ("delivery_address", request.delivery_address.as_str()),
    ])?;
    check_new_password(&request.password)?;

    let email = normalize_email(&request.email);
    if state.buyers.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password_blocking(request.password).await?;
    let buyer = state
        .buyers
        .create(&NewBuyer {
            email,
            password_hash,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            delivery_address: request.delivery_address.trim().to_string(),
            delivery_preferences: request.delivery_preferences,
        })
        .await?;
    info!("🛒 Buyer {} registered", buyer.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Buyer registered",
            "buyer": buyer,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Value>)> {
    require_fields(&[
        ("email", request.email.as_str()),
        ("password", request.password.as_str()),
    ])?;

    let buyer = state
        .buyers
        .find_by_email(&normalize_email(&request.email))
        .await?;
    let stored_hash = buyer.as_ref().map(|account| account.password_hash.clone());
    let verified = verify_login(request.password, stored_hash).await?;
    let buyer = buyer.ok_or(ApiError::InvalidCredentials)?;
    if !verified {
        warn!("Failed buyer login for {}", buyer.id);
        return Err(ApiError::InvalidCredentials);
    }
    if !buyer.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    let jar = start_session(&state, jar, buyer.id, Role::Buyer).await?;
    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "buyer": buyer,
        })),
    ))
}

/// Catalogue of active products with filters and paging
pub async fn home(
    BuyerOnly(_buyer): BuyerOnly,
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> ApiResult<Json<ProductPage>> {
    let query = CatalogQuery::new(
        params.category.as_deref(),
        params.search.as_deref(),
        params.sort.as_deref(),
        params.page,
        params.limit,
        &state.config.catalog,
    );
    debug!("Catalogue query: {:?}", query);

    Ok(Json(state.products.search(&query).await?))
}

pub async fn product_detail(
    BuyerOnly(_buyer): BuyerOnly,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    state
        .products
        .find_listed(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Product {} not found", id)))
}
