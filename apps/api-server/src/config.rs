//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;

use pos_db::DbConfig;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite file, or `:memory:`
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Enforce the `X-API-KEY` header on `/api/v1`
    pub api_key_required: bool,

    /// Stored as an active key at startup when no active key exists
    pub bootstrap_api_key: Option<String>,

    /// Request body limit in bytes (default: 10MB)
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/pos.db".to_string()),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            api_key_required: env::var("API_KEY_REQUIRED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("API_KEY_REQUIRED".to_string()))?,

            bootstrap_api_key: env::var("BOOTSTRAP_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),

            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "10485760".to_string()) // 10MB
                .parse()
                .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string()))?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Defaults suitable for tests: in-memory database, no API key.
    pub fn for_tests() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_path: ":memory:".to_string(),
            db_max_connections: 1,
            api_key_required: false,
            bootstrap_api_key: None,
            max_upload_bytes: 1024 * 1024,
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("HOST".to_string()))
    }

    /// Pool configuration derived from this config.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        let mut config = ServerConfig::for_tests();
        config.port = 9000;
        assert_eq!(config.bind_addr().unwrap().port(), 9000);

        config.host = "not a host".to_string();
        assert!(matches!(
            config.bind_addr(),
            Err(ConfigError::InvalidValue(name)) if name == "HOST"
        ));
    }

    #[test]
    fn test_memory_path_uses_in_memory_pool() {
        assert!(ServerConfig::for_tests().db_config().is_in_memory());

        let mut config = ServerConfig::for_tests();
        config.database_path = "./data/test.db".to_string();
        assert!(!config.db_config().is_in_memory());
    }
}
