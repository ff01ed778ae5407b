//! Route definitions for the Farmgate web server
//!
//! Account routes (register, login, logout) are public. Everything else sits
//! behind [`crate::middleware::authenticate`] and is gated per handler.

use crate::{handlers, middleware::authenticate, AppState};
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health_check))
}

/// Routes that work without a session
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // Admin accounts
        .route("/register", post(handlers::admin::register))
        .route("/login", post(handlers::admin::login))
        .route("/logout", post(handlers::logout))
        // Farmer accounts
        .route("/farmer/register", post(handlers::farmer::register))
        .route("/farmer/login", post(handlers::farmer::login))
        .route("/farmer/logout", post(handlers::logout))
        // Buyer accounts
        .route("/buyer/register", post(handlers::buyer::register))
        .route("/buyer/login", post(handlers::buyer::login))
        .route("/buyer/logout", post(handlers::logout))
}

/// Routes that see the session principal
pub fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/session", get(handlers::session_info))
        // Admin dashboard and approval workflow
        .route("/dashboard", get(handlers::admin::dashboard))
        .route(
            "/dashboard/pending-farmers",
            get(handlers::admin::pending_farmers),
        )
        .route(
            "/dashboard/farmer-profile",
            get(handlers::admin::farmer_profile),
        )
        .route(
            "/dashboard/approve-farmer",
            post(handlers::admin::approve_farmer),
        )
        .route(
            "/dashboard/reject-farmer",
            post(handlers::admin::reject_farmer),
        )
        // Admin user management
        .route("/admin/users", get(handlers::admin::list_users))
        .route(
            "/admin/users/toggle-farmer-status",
            post(handlers::admin::toggle_farmer_status),
        )
        .route(
            "/admin/users/edit-farmer",
            get(handlers::admin::edit_farmer_form).post(handlers::admin::edit_farmer),
        )
        .route(
            "/admin/users/delete-farmer",
            post(handlers::admin::delete_farmer),
        )
        .route(
            "/admin/users/toggle-buyer-status",
            post(handlers::admin::toggle_buyer_status),
        )
        .route(
            "/admin/users/edit-buyer",
            get(handlers::admin::edit_buyer_form).post(handlers::admin::edit_buyer),
        )
        .route(
            "/admin/users/delete-buyer",
            post(handlers::admin::delete_buyer),
        )
        // Farmer area
        .route("/farmer/dashboard", get(handlers::farmer::dashboard))
        .route("/farmer/notifications", get(handlers::farmer::notifications))
        .route(
            "/farmer/product/add-product",
            post(handlers::product::add_product),
        )
        .route(
            "/farmer/product/list-products",
            get(handlers::product::list_products).post(handlers::product::list_products),
        )
        .route(
            "/farmer/product/edit-product",
            post(handlers::product::edit_product),
        )
        .route(
            "/farmer/product/delete-product",
            delete(handlers::product::delete_product),
        )
        // Buyer catalogue and cart
        .route("/buyer/home", get(handlers::buyer::home))
        .route("/buyer/product/{id}", get(handlers::buyer::product_detail))
        .route("/cart", get(handlers::cart::view_cart))
        .route("/cart/add", post(handlers::cart::add_to_cart))
        .route("/cart/update", post(handlers::cart::update_cart))
        .route(
            "/cart/remove/{product_id}",
            delete(handlers::cart::remove_from_cart),
        )
        .route_layer(from_fn_with_state(state.clone(), authenticate))
}

/// Public and protected routes combined
pub fn app_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
}
