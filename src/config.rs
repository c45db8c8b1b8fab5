use thiserror::Error;

use crate::tokens::MAX_PASSWORD_LEN;

/// Longest token lifetime accepted from configuration (10 years)
pub const MAX_TOKEN_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Password of the `admin` account provisioned at startup
    pub admin_password: String,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC key for signing tokens. Changing it invalidates every issued token.
    pub signing_key: String,
    pub ttl_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            signing_key: String::new(),
            ttl_seconds: 86400, // 24 hours
        }
    }
}

impl TokenConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_seconds as i64)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let signing_key = std::env::var("JWT_KEY").unwrap_or_default();
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_default();

        let bind_address = std::env::var("BIND_ADDRESS")
            .or_else(|_| std::env::var("BACKEND_INTERFACE"))
            .unwrap_or_else(|_| ServerConfig::default().bind_address);

        let data_dir =
            std::env::var("DATA_DIR").unwrap_or_else(|_| ServerConfig::default().data_dir);

        let ttl_seconds = parse_var("TOKEN_TTL_SECONDS")?.unwrap_or(86400);
        let bcrypt_cost = parse_var("BCRYPT_COST")?.unwrap_or(bcrypt::DEFAULT_COST);

        let config = Config {
            auth: AuthConfig {
                admin_password,
                bcrypt_cost,
            },
            server: ServerConfig {
                bind_address,
                data_dir,
            },
            tokens: TokenConfig {
                signing_key,
                ttl_seconds,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tokens.signing_key.is_empty() {
            return Err(ConfigError::ValidationError(
                "JWT_KEY is not set".to_string(),
            ));
        }
        if self.auth.admin_password.is_empty() {
            return Err(ConfigError::ValidationError(
                "ADMIN_PASSWORD is not set".to_string(),
            ));
        }
        if self.auth.admin_password.len() > MAX_PASSWORD_LEN {
            return Err(ConfigError::ValidationError(format!(
                "ADMIN_PASSWORD is longer than {MAX_PASSWORD_LEN} bytes"
            )));
        }
        if self.tokens.ttl_seconds == 0 || self.tokens.ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(ConfigError::ValidationError(format!(
                "TOKEN_TTL_SECONDS must be between 1 and {MAX_TOKEN_TTL_SECONDS}, got {}",
                self.tokens.ttl_seconds
            )));
        }
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(ConfigError::ValidationError(format!(
                "BCRYPT_COST must be between 4 and 31, got {}",
                self.auth.bcrypt_cost
            )));
        }
        if self.auth.bcrypt_cost < bcrypt::DEFAULT_COST {
            tracing::warn!(
                "BCRYPT_COST {} is below the recommended {}. Only use this for testing.",
                self.auth.bcrypt_cost,
                bcrypt::DEFAULT_COST
            );
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::ValidationError(format!("{name} is not a valid number"))),
        Err(_) => Ok(None),
    }
}
