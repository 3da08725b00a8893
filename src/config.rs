use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub allocator: AllocatorConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    /// Maximum JSON request body size in bytes
    pub max_body_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// How many times asset creation re-allocates after losing an id to a
    /// concurrent writer
    pub insert_attempts: u32,
}

/// Log output selected by `LOG_FORMAT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Google Cloud structured logging
    Gcp,
    Json,
    Plain,
}

impl LogFormat {
    /// Unknown or missing values fall back to plain text.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "gcp" => LogFormat::Gcp,
            "json" => LogFormat::Json,
            _ => LogFormat::Plain,
        }
    }

    /// Read before the rest of the config so that loading can log.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self { insert_attempts: 5 }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let insert_attempts = match std::env::var("ASSET_INSERT_ATTEMPTS") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "ASSET_INSERT_ATTEMPTS must be a positive integer, got '{raw}'"
                ))
            })?,
            Err(_) => AllocatorConfig::default().insert_attempts,
        };

        let max_body_size = std::env::var("MAX_BODY_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1024 * 1024); // 1MB

        let config = Config {
            server: ServerConfig {
                bind_address,
                data_dir,
            },
            allocator: AllocatorConfig { insert_attempts },
            test_mode,
            max_body_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.data_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty".to_string(),
            ));
        }

        if self.allocator.insert_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "ASSET_INSERT_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if self.test_mode {
            tracing::warn!("TEST_MODE is enabled. Never run this configuration in production.");
        }

        Ok(())
    }
}
