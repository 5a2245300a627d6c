//! Configuration for Refuge
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Refuge - pet adoption and animal welfare community service
#[derive(Parser, Debug, Clone)]
#[command(name = "refuge")]
#[command(about = "HTTP service for the Refuge animal-welfare platform")]
pub struct Args {
    /// Unique node identifier for this service instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// MongoDB connection URI. Required: the service cannot start without
    /// its document store.
    #[arg(long, env = "MONGODB_URI")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "refuge")]
    pub mongodb_db: String,

    /// JWT secret used to validate session tokens (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// Enable development mode (tolerates a fixed insecure JWT secret)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Store request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "5000")]
    pub request_timeout_ms: u64,

    /// Maximum page size for list endpoints
    #[arg(long, env = "MAX_PAGE_SIZE", default_value = "100")]
    pub max_page_size: i64,
}

impl Args {
    /// Get effective JWT secret (uses a fixed insecure value in dev mode)
    pub fn jwt_secret(&self) -> String {
        if self.dev_mode {
            self.jwt_secret
                .clone()
                .unwrap_or_else(|| "dev-only-insecure-secret".to_string())
        } else {
            self.jwt_secret.clone().unwrap_or_default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.mongodb_uri.trim().is_empty() {
            return Err("MONGODB_URI must not be empty".to_string());
        }

        if !self.dev_mode && self.jwt_secret.as_deref().unwrap_or("").is_empty() {
            return Err("JWT_SECRET is required in production mode".to_string());
        }

        if self.max_page_size <= 0 {
            return Err("MAX_PAGE_SIZE must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            node_id: Uuid::new_v4(),
            listen: "127.0.0.1:8080".parse().unwrap(),
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            mongodb_db: "refuge".to_string(),
            jwt_secret: Some("secret".to_string()),
            dev_mode: false,
            log_level: "info".to_string(),
            request_timeout_ms: 5000,
            max_page_size: 100,
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_mongodb_uri() {
        let mut args = base_args();
        args.mongodb_uri = "  ".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_requires_jwt_secret_in_production() {
        let mut args = base_args();
        args.jwt_secret = None;
        assert!(args.validate().is_err());

        args.dev_mode = true;
        assert!(args.validate().is_ok());
        assert_eq!(args.jwt_secret(), "dev-only-insecure-secret");
    }
}
