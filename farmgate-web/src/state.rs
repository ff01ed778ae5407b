//! Application state shared by every handler

use crate::{
    clock::{Clock, SystemClock},
    database,
    models::{AdminStore, BuyerStore, CartStore, FarmerStore, NotificationStore, ProductStore},
    session::SessionStore,
    WebConfig, WebResult,
};
use chrono::Duration;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, info};

/// Stores and settings, built once at startup and cloned into each request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<WebConfig>,
    pub pool: SqlitePool,
    pub sessions: SessionStore,
    pub admins: AdminStore,
    pub farmers: FarmerStore,
    pub buyers: BuyerStore,
    pub products: ProductStore,
    pub carts: CartStore,
    pub notifications: NotificationStore,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Like [`AppState::new`], reading session time from `clock`
    pub async fn with_clock(config: WebConfig, clock: Arc<dyn Clock>) -> WebResult<Self> {
        config.validate()?;
        let pool = database::connect(&config.database_url, config.max_connections).await?;
        let ttl = Duration::hours(config.session.ttl_hours);

        info!(
            "Session TTL {}h, SameSite {}",
            config.session.ttl_hours, config.session.same_site
        );

        Ok(Self {
            sessions: SessionStore::new(pool.clone(), ttl, clock),
            admins: AdminStore::new(pool.clone()),
            farmers: FarmerStore::new(pool.clone()),
            buyers: BuyerStore::new(pool.clone()),
            products: ProductStore::new(pool.clone()),
            carts: CartStore::new(pool.clone()),
            notifications: NotificationStore::new(pool.clone()),
            pool,
            config: Arc::new(config),
        })
    }

    /// Drop sessions that expired without being used again
    pub async fn cleanup_expired_sessions(&self) {
        match self.sessions.purge_expired().await {
            Ok(0) => {}
            Ok(count) => info!("🧹 Removed {} expired sessions", count),
            Err(e) => error!("Failed to purge expired sessions: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use farmgate_core::Role;

    fn memory_config() -> WebConfig {
        WebConfig {
            database_url: "sqlite::memory:".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_state_uses_configured_ttl() {
        let mut config = memory_config();
        config.session.ttl_hours = 2;
        let state = AppState::new(config).await.unwrap();
        assert_eq!(state.sessions.ttl(), Duration::hours(2));
    }

    #[tokio::test]
    async fn test_cleanup_purges_expired_sessions() {
        let clock = Arc::new(ManualClock::default());
        let state = AppState::with_clock(memory_config(), clock.clone())
            .await
            .unwrap();
        let issued = state.sessions.create(1, Role::Buyer).await.unwrap();

        clock.advance(Duration::hours(25));
        state.cleanup_expired_sessions().await;

        clock.set(issued.expires_at - Duration::hours(1));
        assert!(state.sessions.resolve(&issued.token).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = memory_config();
        config.session.ttl_hours = -1;
        assert!(AppState::new(config).await.is_err());
    }
}
