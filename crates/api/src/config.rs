//! Environment-driven configuration for the API server.
//!
//! Recognized variables:
//!
//! - `API_HOST`: bind address (default "0.0.0.0")
//! - `API_PORT`: listen port (default 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: trace/debug/info/warn/error (default "info")
//! - `API_CORS_ORIGINS`: comma-separated list of allowed origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: request timeout (default 30)

use std::env;

use eyre::{Result, WrapErr};
use tracing::Level;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origins: Option<Vec<String>>,
    pub request_timeout: u64,
}

impl ApiConfig {
    /// Loads configuration from the environment, applying defaults where a
    /// variable is unset. Fails when `DATABASE_URL` is missing or `API_PORT`
    /// is not a valid port number.
    pub fn from_env() -> Result<Self> {
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        let log_level = match env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let cors_origins = env::var("API_CORS_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
