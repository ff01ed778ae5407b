//! Session and catalogue settings

use crate::error::FarmgateResult;
use crate::types::SameSitePolicy;
use crate::{config_error, validation_error};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Session lifetime and cookie attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hours a session stays valid after login
    pub ttl_hours: i64,
    /// `SameSite` policy for the session cookie
    pub same_site: SameSitePolicy,
    /// Whether to mark the cookie `Secure`
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: 24,
            same_site: SameSitePolicy::Strict,
            secure: false,
        }
    }
}

impl SessionConfig {
    /// `SameSite=None` cookies are dropped by browsers unless they are also `Secure`
    pub fn cookie_secure(&self) -> bool {
        self.secure || self.same_site == SameSitePolicy::None
    }

    pub fn validate(&self) -> FarmgateResult<()> {
        if self.ttl_hours <= 0 {
            return Err(config_error!(
                "session.ttl_hours must be greater than 0",
                "session"
            ));
        }

        if self.same_site == SameSitePolicy::None && !self.secure {
            warn!("session.same_site is none; the cookie will be sent with Secure");
        }

        Ok(())
    }
}

/// Product listing defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Stock level at or below which a product shows up as low stock
    pub low_stock_threshold: i64,
    /// Page size when the request does not ask for one
    pub default_page_size: u32,
    /// Upper bound on requested page sizes
    pub max_page_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: 5,
            default_page_size: 12,
            max_page_size: 100,
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> FarmgateResult<()> {
        if self.low_stock_threshold < 0 {
            return Err(validation_error!(
                "low_stock_threshold cannot be negative",
                "low_stock_threshold",
                "catalog"
            ));
        }

        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(validation_error!(
                "page sizes must be greater than 0",
                "default_page_size",
                "catalog"
            ));
        }

        if self.default_page_size > self.max_page_size {
            return Err(validation_error!(
                "default_page_size cannot exceed max_page_size",
                "default_page_size",
                "catalog"
            ));
        }

        Ok(())
    }
}
