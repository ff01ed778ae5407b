//! Farmgate Web Server
//!
//! Session-authenticated JSON backend for a three-role farmer marketplace.

pub mod auth;
pub mod clock;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;

// Re-export main types
pub use error::{ApiError, ApiResult};
pub use server::FarmgateServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Router,
};
use farmgate_core::{CatalogConfig, FarmgateError, LoggingConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    routes::app_routes(&state)
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE])
}

/// Configuration for the web server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// SQLite connection URL
    pub database_url: String,
    /// Pool size for file-backed databases
    pub max_connections: u32,
    /// Origins allowed to make credentialed cross-site requests
    pub allowed_origins: Vec<String>,
    pub session: SessionConfig,
    pub catalog: CatalogConfig,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            database_url: "sqlite://farmgate.db".to_string(),
            max_connections: 5,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            session: SessionConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl WebConfig {
    /// Layer built-in defaults, an optional config file and `FARMGATE_*` variables
    ///
    /// Nested keys use a double underscore, e.g. `FARMGATE_SESSION__TTL_HOURS=12`.
    pub fn load(path: Option<&Path>) -> WebResult<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| WebError::Config(format!("Failed to encode defaults: {}", e)))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix("FARMGATE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins"),
            )
            .build()
            .map_err(|e| WebError::Config(format!("Failed to load configuration: {}", e)))?;

        let config: WebConfig = settings
            .try_deserialize()
            .map_err(|e| WebError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> WebResult<Self> {
        Self::load(None)
    }

    pub fn validate(&self) -> WebResult<()> {
        self.session.validate()?;
        self.catalog.validate()?;
        if self.max_connections == 0 {
            return Err(WebError::Config(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> WebResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| WebError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] FarmgateError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging(level: &str) -> WebResult<()> {
    farmgate_core::init_logging(&LoggingConfig::with_level(level))
        .map_err(|e| WebError::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_merges_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "port = 9090\n\n[session]\nttl_hours = 12\nsame_site = \"lax\"\n\n[catalog]\nlow_stock_threshold = 3"
        )
        .unwrap();

        let config = WebConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.session.ttl_hours, 12);
        assert_eq!(config.session.same_site, farmgate_core::SameSitePolicy::Lax);
        assert_eq!(config.catalog.low_stock_threshold, 3);
        assert_eq!(config.catalog.default_page_size, 12);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[session]\nttl_hours = 0").unwrap();

        assert!(WebConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_config_renders_as_toml() {
        let rendered = WebConfig::default().to_toml().unwrap();
        assert!(rendered.contains("port = 8080"));
        assert!(rendered.contains("[session]"));
        assert_eq!(WebConfig::default().address(), "127.0.0.1:8080");
    }
}
