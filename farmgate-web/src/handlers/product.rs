//! Product management for the signed-in farmer

use super::types::{AddProductRequest, EditProductRequest, IdQuery};
use crate::{
    auth::FarmerOnly,
    error::{ApiError, ApiJson, ApiResult},
    models::{NewProduct, Product, ProductUpdate},
    AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use farmgate_core::validate_product_fields;
use serde_json::{json, Value};
use tracing::info;

fn product_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Product {} not found", id))
}

fn clean_images(images: Vec<String>) -> Vec<String> {
    images
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

pub async fn add_product(
    FarmerOnly(farmer): FarmerOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddProductRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    validate_product_fields(
        &request.name,
        request.category_id,
        request.price,
        request.quantity,
    )?;

    let product = state
        .products
        .create(
            farmer.id,
            &NewProduct {
                name: request.name.trim().to_string(),
                category_id: request.category_id,
                price: request.price,
                quantity: request.quantity,
                description: request.description.trim().to_string(),
                images: clean_images(request.images),
            },
        )
        .await?;
    info!("📦 Farmer {} added product {}", farmer.id, product.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product added",
            "product": product,
        })),
    ))
}

/// The farmer's own products, inactive ones included
pub async fn list_products(
    FarmerOnly(farmer): FarmerOnly,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.products.list_for_farmer(farmer.id).await?))
}

pub async fn edit_product(
    FarmerOnly(farmer): FarmerOnly,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EditProductRequest>,
) -> ApiResult<Json<Value>> {
    validate_product_fields(
        &request.name,
        request.category_id,
        request.price,
        request.quantity,
    )?;

    let update = ProductUpdate {
        name: request.name.trim().to_string(),
        category_id: request.category_id,
        price: request.price,
        quantity: request.quantity,
        description: request.description.trim().to_string(),
        is_active: request.is_active,
        images: request.images.map(clean_images),
    };
    // Products owned by someone else look the same as missing ones
    let product = state
        .products
        .update(farmer.id, request.id, &update)
        .await?
        .ok_or_else(|| product_not_found(request.id))?;

    Ok(Json(json!({
        "success": true,
        "message": "Product updated",
        "product": product,
    })))
}

pub async fn delete_product(
    FarmerOnly(farmer): FarmerOnly,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> ApiResult<Json<Value>> {
    if !state.products.delete(farmer.id, query.id).await? {
        return Err(product_not_found(query.id));
    }
    info!("Farmer {} deleted product {}", farmer.id, query.id);

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted",
    })))
}
