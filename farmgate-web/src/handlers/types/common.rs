//! Common types used across multiple handlers

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Whether the database answered
    pub database: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Body naming a single record
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdRequest {
    pub id: i64,
}

/// `?id=` query parameter
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}
