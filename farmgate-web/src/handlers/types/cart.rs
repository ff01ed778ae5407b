//! Cart payloads

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CartRequest {
    #[serde(rename = "productId")]
    pub product_id: i64,
    pub quantity: i64,
}
