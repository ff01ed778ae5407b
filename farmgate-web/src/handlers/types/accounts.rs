//! Registration, login and account management payloads

use crate::models::{Buyer, BuyerUpdate, Farmer, FarmerUpdate, Notification, Product};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminRegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FarmerRegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub farm_name: String,
    pub farm_size: String,
    pub location: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuyerRegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub delivery_address: String,
    pub delivery_preferences: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RejectFarmerRequest {
    pub id: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct EditFarmerRequest {
    pub id: i64,
    #[serde(flatten)]
    pub update: FarmerUpdate,
}

#[derive(Debug, Deserialize)]
pub struct EditBuyerRequest {
    pub id: i64,
    #[serde(flatten)]
    pub update: BuyerUpdate,
}

/// Admin landing page counters
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub pending_farmers: i64,
    pub approved_farmers: i64,
    pub buyers: i64,
    pub active_products: i64,
}

#[derive(Debug, Serialize)]
pub struct FarmerProfile {
    pub farmer: Farmer,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct UserListing {
    pub farmers: Vec<Farmer>,
    pub buyers: Vec<Buyer>,
}

#[derive(Debug, Serialize)]
pub struct FarmerDashboard {
    pub farmer: Farmer,
    pub product_count: i64,
    pub low_stock_threshold: i64,
    pub low_stock_products: Vec<Product>,
    pub unsent_notifications: i64,
    pub recent_notifications: Vec<Notification>,
}
