//! Farmgate Web Server
//!
//! Marketplace backend connecting farmers and buyers.

use anyhow::Context;
use clap::Parser;
use farmgate_web::server::FarmgateServerBuilder;
use farmgate_web::{init_logging, WebConfig};
use std::path::PathBuf;

/// Farmgate Web Server - farmer marketplace backend
#[derive(Parser)]
#[command(name = "farmgate-web")]
#[command(about = "Marketplace backend for farmers and buyers")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    /// Command line flags win over every other source
    fn apply(&self, config: &mut WebConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.dev {
            config.dev_mode = true;
        }
        if let Some(database_url) = &self.database_url {
            config.database_url = database_url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    init_logging(&args.log_level)?;

    let mut config = WebConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    println!("🚀 Starting Farmgate Web Server");
    println!("📍 Server: http://{}", config.address());
    println!("🔧 Development mode: {}", config.dev_mode);
    println!("🗄️  Database: {}", config.database_url);

    let server = FarmgateServerBuilder::from_config(config)
        .build()
        .await
        .context("Failed to build server")?;

    server.start().await.context("Server stopped with an error")?;

    println!("✅ Server shut down gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["farmgate-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.dev);
        assert_eq!(args.log_level, "info");

        let args = Args::parse_from([
            "farmgate-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--config",
            "farmgate.toml",
            "--print-config",
        ]);
        assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(args.port, Some(3000));
        assert!(args.dev);
        assert_eq!(args.config, Some(PathBuf::from("farmgate.toml")));
        assert!(args.print_config);
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "farmgate-web",
            "--port",
            "9000",
            "--database-url",
            "sqlite::memory:",
        ]);
        let mut config = WebConfig::default();
        args.apply(&mut config);

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(!config.dev_mode);
    }
}
