//! Farmgate Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Main Farmgate server
pub struct FarmgateServer {
    config: WebConfig,
    state: AppState,
}

impl FarmgateServer {
    /// Create a new server, connecting to the configured database
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Serve an already built state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config.as_ref().clone(),
            state,
        }
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Farmgate Web Server");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        // Expired sessions are otherwise only removed when someone presents them
        let cleanup_state = self.state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                cleanup_state.cleanup_expired_sessions().await;
            }
        });

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for FarmgateServer
pub struct FarmgateServerBuilder {
    config: WebConfig,
}

impl FarmgateServerBuilder {
    /// Start from the built-in defaults
    pub fn new() -> Self {
        Self::from_config(WebConfig::default())
    }

    /// Start from a loaded configuration
    pub fn from_config(config: WebConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = database_url.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<FarmgateServer> {
        FarmgateServer::new(self.config).await
    }
}

impl Default for FarmgateServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let server = FarmgateServerBuilder::new()
            .database_url("sqlite::memory:")
            .build()
            .await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = FarmgateServerBuilder::new()
            .host("localhost")
            .port(3000)
            .dev_mode(true)
            .database_url("sqlite::memory:");

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert!(builder.config.dev_mode);
        assert_eq!(builder.config.database_url, "sqlite::memory:");
    }

    #[tokio::test]
    async fn test_with_state_reuses_config() {
        let config = WebConfig {
            port: 9191,
            database_url: "sqlite::memory:".to_string(),
            ..WebConfig::default()
        };
        let state = AppState::new(config.clone()).await.unwrap();
        let server = FarmgateServer::with_state(state);

        assert_eq!(server.config(), &config);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = WebConfig::default();
        config.session.ttl_hours = 0;
        assert!(config.validate().is_err());
    }
}
