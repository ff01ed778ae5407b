//! Product payloads

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AddProductRequest {
    pub name: String,
    pub category_id: i64,
    pub price: f64,
    pub quantity: i64,
    pub description: String,
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditProductRequest {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Omit to keep the current images
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

/// Query string of the buyer catalogue
#[derive(Debug, Default, Deserialize)]
pub struct CatalogParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
