//! Admin accounts and the farmer approval workflow

use super::types::{
    AdminRegisterRequest, DashboardStats, EditBuyerRequest, EditFarmerRequest, FarmerProfile,
    IdQuery, IdRequest, LoginRequest, RejectFarmerRequest, UserListing,
};
use super::{check_new_password, require_fields, start_session};
use crate::{
    auth::{
        password::{hash_password_blocking, verify_login},
        AdminOnly,
    },
    error::{ApiError, ApiJson, ApiResult},
    models::{normalize_email, Buyer, Farmer, FarmerStatus, NotificationKind},
    AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use farmgate_core::Role;
use serde_json::{json, Value};
use tracing::{info, warn};

fn farmer_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Farmer {} not found", id))
}

fn buyer_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Buyer {} not found", id))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AdminRegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    require_fields(&[
        ("email", request.email.as_str()),
        ("password", request.password.as_str()),
        ("confirm_password", request.confirm_password.as_str()),
    ])?;
    if request.password != request.confirm_password {
        return Err(ApiError::BadRequest("Passwords do not match".to_string()));
    }
    check_new_password(&request.password)?;

    let email = normalize_email(&request.email);
    if state.admins.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_password_blocking(request.password).await?;
    let admin = state.admins.create(&email, &password_hash).await?;
    info!("👤 Admin {} registered", admin.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Admin registered",
            "admin": admin,
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

    let admin = state
        .admins
        .find_by_email(&normalize_email(&request.email))
        .await?;
    let stored_hash = admin.as_ref().map(|account| account.password_hash.clone());
    let verified = verify_login(request.password, stored_hash).await?;
    let admin = admin.ok_or(ApiError::InvalidCredentials)?;
    if !verified {
        warn!("Failed admin login for {}", admin.id);
        return Err(ApiError::InvalidCredentials);
    }
    if !admin.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    let jar = start_session(&state, jar, admin.id, Role::Admin).await?;
    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "admin": admin,
        })),
    ))
}

pub async fn dashboard(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(DashboardStats {
        pending_farmers: state.farmers.count_by_status(FarmerStatus::Pending).await?,
        approved_farmers: state.farmers.count_by_status(FarmerStatus::Approved).await?,
        buyers: state.buyers.count().await?,
        active_products: state.products.count_active().await?,
    }))
}

pub async fn pending_farmers(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Farmer>>> {
    Ok(Json(state.farmers.list_by_status(FarmerStatus::Pending).await?))
}

pub async fn farmer_profile(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<FarmerProfile>> {
    let farmer = state
        .farmers
        .find_by_id(query.id)
        .await?
        .ok_or_else(|| farmer_not_found(query.id))?;
    let products = state.products.list_for_farmer(farmer.id).await?;

    Ok(Json(FarmerProfile { farmer, products }))
}

pub async fn approve_farmer(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdRequest>,
) -> ApiResult<Json<Value>> {
    let farmer = state
        .farmers
        .approve(request.id)
        .await?
        .ok_or_else(|| farmer_not_found(request.id))?;
    info!("✅ Admin {} approved farmer {}", admin.id, farmer.id);

    let message = format!(
        "Your farm {} has been approved. You can now log in and list products.",
        farmer.farm_name
    );
    if let Err(e) = state
        .notifications
        .create(farmer.id, NotificationKind::FarmerApproved, &message)
        .await
    {
        warn!("Failed to queue approval notification for farmer {}: {}", farmer.id, e);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Farmer approved",
        "farmer": farmer,
    })))
}

pub async fn reject_farmer(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RejectFarmerRequest>,
) -> ApiResult<Json<Value>> {
    require_fields(&[("reason", request.reason.as_str())])?;

    let farmer = state
        .farmers
        .reject(request.id, request.reason.trim())
        .await?
        .ok_or_else(|| farmer_not_found(request.id))?;
    state.sessions.destroy_for_subject(farmer.id, Role::Farmer).await?;
    info!("Admin {} rejected farmer {}", admin.id, farmer.id);

    let message = format!(
        "Your registration for {} was not approved: {}",
        farmer.farm_name,
        request.reason.trim()
    );
    if let Err(e) = state
        .notifications
        .create(farmer.id, NotificationKind::FarmerRejected, &message)
        .await
    {
        warn!("Failed to queue rejection notification for farmer {}: {}", farmer.id, e);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Farmer rejected",
        "farmer": farmer,
    })))
}

pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<UserListing>> {
    Ok(Json(UserListing {
        farmers: state.farmers.list_all().await?,
        buyers: state.buyers.list_all().await?,
    }))
}

pub async fn toggle_farmer_status(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdRequest>,
) -> ApiResult<Json<Value>> {
    let is_active = state
        .farmers
        .toggle_active(request.id)
        .await?
        .ok_or_else(|| farmer_not_found(request.id))?;
    if !is_active {
        state.sessions.destroy_for_subject(request.id, Role::Farmer).await?;
    }

    Ok(Json(json!({
        "success": true,
        "id": request.id,
        "is_active": is_active,
    })))
}

pub async fn edit_farmer_form(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<Farmer>> {
    let farmer = state
        .farmers
        .find_by_id(query.id)
        .await?
        .ok_or_else(|| farmer_not_found(query.id))?;
    Ok(Json(farmer))
}

pub async fn edit_farmer(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EditFarmerRequest>,
) -> ApiResult<Json<Value>> {
    let mut update = request.update;
    require_fields(&[
        ("email", update.email.as_str()),
        ("first_name", update.first_name.as_str()),
        ("last_name", update.last_name.as_str()),
        ("farm_name", update.farm_name.as_str()),
        ("farm_size", update.farm_size.as_str()),
        ("location", update.location.as_str()),
    ])?;
    update.email = normalize_email(&update.email);

    let farmer = state
        .farmers
        .update(request.id, &update)
        .await?
        .ok_or_else(|| farmer_not_found(request.id))?;
    if !farmer.can_sign_in() {
        state.sessions.destroy_for_subject(farmer.id, Role::Farmer).await?;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Farmer updated",
        "farmer": farmer,
    })))
}

pub async fn delete_farmer(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdRequest>,
) -> ApiResult<Json<Value>> {
    if !state.farmers.delete(request.id).await? {
        return Err(farmer_not_found(request.id));
    }
    state.sessions.destroy_for_subject(request.id, Role::Farmer).await?;
    info!("🗑️  Admin {} deleted farmer {}", admin.id, request.id);

    Ok(Json(json!({
        "success": true,
        "message": "Farmer deleted",
    })))
}

pub async fn toggle_buyer_status(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdRequest>,
) -> ApiResult<Json<Value>> {
    let is_active = state
        .buyers
        .toggle_active(request.id)
        .await?
        .ok_or_else(|| buyer_not_found(request.id))?;
    if !is_active {
        state.sessions.destroy_for_subject(request.id, Role::Buyer).await?;
    }

    Ok(Json(json!({
        "success": true,
        "id": request.id,
        "is_active": is_active,
    })))
}

pub async fn edit_buyer_form(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<Buyer>> {
    let buyer = state
        .buyers
        .find_by_id(query.id)
        .await?
        .ok_or_else(|| buyer_not_found(query.id))?;
    Ok(Json(buyer))
}

pub async fn edit_buyer(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EditBuyerRequest>,
) -> ApiResult<Json<Value>> {
    let mut update = request.update;
    require_fields(&[
        ("email", update.email.as_str()),
        ("first_name", update.first_name.as_str()),
        ("last_name", update.last_name.as_str()),
        ("delivery_address", update.delivery_address.as_str()),
    ])?;
    update.email = normalize_email(&update.email);

    let buyer = state
        .buyers
        .update(request.id, &update)
        .await?
        .ok_or_else(|| buyer_not_found(request.id))?;
    if !buyer.is_active {
        state.sessions.destroy_for_subject(buyer.id, Role::Buyer).await?;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Buyer updated",
        "buyer": buyer,
    })))
}

pub async fn delete_buyer(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<IdRequest>,
) -> ApiResult<Json<Value>> {
    if !state.buyers.delete(request.id).await? {
        return Err(buyer_not_found(request.id));
    }
    state.sessions.destroy_for_subject(request.id, Role::Buyer).await?;
    info!("🗑️  Admin {} deleted buyer {}", admin.id, request.id);

    Ok(Json(json!({
        "success": true,
        "message": "Buyer deleted",
    })))
}
