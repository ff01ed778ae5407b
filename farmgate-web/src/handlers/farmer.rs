//! Farmer registration, login and dashboard

use super::types::{FarmerDashboard, FarmerRegisterRequest, LoginRequest};
use super::{check_new_password, require_fields, start_session};
use crate::{
    auth::{
        password::{hash_password_blocking, verify_login},
        FarmerOnly,
    },
    error::{ApiError, ApiJson, ApiResult},
    models::{normalize_email, FarmerStatus, NewFarmer, Notification},
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use farmgate_core::Role;
use serde_json::{json, Value};
use tracing::{info, warn};

const RECENT_NOTIFICATIONS: usize = 5;

/// Register a farmer; the account waits for admin approval
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<FarmerRegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_fields(&[
        ("email", request.email.as_str()),
        ("password", request.password.as_str()),
        ("first_name", request.first_name.as_str()),
        ("last_name", request.last_name.as_str()),
        ("farm_name", request.farm_name.as_str()),
        ("farm_size", request.farm_size.as_str()),
        ("location", request.location.as_str()),
    ])?;
    check_new_password(&request.password)?;

    let email = normalize_email(&request.email);
    if state.farmers.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password_blocking(request.password).await?;
    let farmer = state
        .farmers
        .create(&NewFarmer {
            email,
            password_hash,
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            farm_name: request.farm_name.trim().to_string(),
            farm_size: request.farm_size.trim().to_string(),
            location: request.location.trim().to_string(),
        })
        .await?;
    info!("🌱 Farmer {} registered, awaiting approval", farmer.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Registration received. An admin will review your account.",
            "farmer": farmer,
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

    let farmer = state
        .farmers
        .find_by_email(&normalize_email(&request.email))
        .await?;
    let stored_hash = farmer.as_ref().map(|account| account.password_hash.clone());
    let verified = verify_login(request.password, stored_hash).await?;
    let farmer = farmer.ok_or(ApiError::InvalidCredentials)?;
    if !verified {
        warn!("Failed farmer login for {}", farmer.id);
        return Err(ApiError::InvalidCredentials);
    }

    let refusal = match farmer.status {
        FarmerStatus::Pending => Some("Your account is awaiting admin approval"),
        FarmerStatus::Rejected => Some("Your registration was not approved"),
        FarmerStatus::Approved if !farmer.is_active => Some("Account is deactivated"),
        FarmerStatus::Approved => None,
    };
    if let Some(message) = refusal {
        return Err(ApiError::Forbidden(message.to_string()));
    }

    let jar = start_session(&state, jar, farmer.id, Role::Farmer).await?;
    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "farmer": farmer,
        })),
    ))
}

pub async fn dashboard(
    FarmerOnly(farmer): FarmerOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<FarmerDashboard>> {
    let low_stock_threshold = state.config.catalog.low_stock_threshold;
    let product_count = state.products.count_for_farmer(farmer.id).await?;
    let low_stock_products = state.products.low_stock(farmer.id, low_stock_threshold).await?;
    let unsent_notifications = state.notifications.count_unsent(farmer.id).await?;
    let mut recent_notifications = state.notifications.list_for(farmer.id).await?;
    recent_notifications.truncate(RECENT_NOTIFICATIONS);

    Ok(Json(FarmerDashboard {
        farmer,
        product_count,
        low_stock_threshold,
        low_stock_products,
        unsent_notifications,
        recent_notifications,
    }))
}

pub async fn notifications(
    FarmerOnly(farmer): FarmerOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.notifications.list_for(farmer.id).await?))
}
