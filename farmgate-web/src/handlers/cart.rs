//! Shopping cart of the signed-in buyer

use super::types::CartRequest;
use crate::{
    auth::BuyerOnly,
    error::{ApiJson, ApiResult},
    models::Cart,
    AppState,
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

pub async fn view_cart(
    BuyerOnly(buyer): BuyerOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<Cart>> {
    Ok(Json(state.carts.load(buyer.id).await?))
}

pub async fn add_to_cart(
    BuyerOnly(buyer): BuyerOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CartRequest>,
) -> ApiResult<Json<Value>> {
    let quantity = state
        .carts
        .add(buyer.id, request.product_id, request.quantity)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Added to cart",
        "productId": request.product_id,
        "quantity": quantity,
    })))
}

/// Set a line's quantity; zero removes it
pub async fn update_cart(
    BuyerOnly(buyer): BuyerOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CartRequest>,
) -> ApiResult<Json<Value>> {
    state
        .carts
        .update(buyer.id, request.product_id, request.quantity)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Cart updated",
        "productId": request.product_id,
        "quantity": request.quantity,
    })))
}

pub async fn remove_from_cart(
    BuyerOnly(buyer): BuyerOnly,
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    state.carts.remove(buyer.id, product_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Removed from cart",
    })))
}
