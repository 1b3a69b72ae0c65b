use serde::{Deserialize, Serialize};

use crate::database::DatabaseConfig;
use crate::utils::get_env_with_prefix;

/// Configuration errors reported by [`ConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Main configuration for the authorization engine
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Token verification settings.
///
/// Exactly one key source is used: the RSA public key wins over the shared
/// secret when both are set.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Expected `aud` claim (the OAuth client id).
    #[serde(default)]
    pub audience: String,
    /// Expected `iss` claim, if issuer validation is wanted.
    #[serde(default)]
    pub issuer: Option<String>,
    /// HS256 shared secret.
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<String>,
    /// RS256 public key in PEM format.
    #[serde(default)]
    pub jwt_public_key_pem: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the log level (trace, debug, info, warn or error)
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Enable or disable JSON formatted logs
    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Replace the whole database configuration
    pub fn with_database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = database;
        self
    }

    /// Set the database connection URL
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database.url = url.into();
        self
    }

    /// Set the expected token audience
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.config.auth.audience = audience.into();
        self
    }

    /// Require tokens from this issuer
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.config.auth.issuer = Some(issuer.into());
        self
    }

    /// Verify tokens with an HS256 shared secret
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.auth.jwt_secret = Some(secret.into());
        self
    }

    /// Verify tokens with an RS256 public key in PEM format
    pub fn with_jwt_public_key_pem(mut self, pem: impl Into<String>) -> Self {
        self.config.auth.jwt_public_key_pem = Some(pem.into());
        self
    }

    /// Load configuration from environment variables with ORGAUTH_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        self.config.database = self.config.database.with_env_overrides();

        if let Some(audience) = get_env_with_prefix("AUTH_AUDIENCE") {
            self.config.auth.audience = audience;
        }
        if let Some(issuer) = get_env_with_prefix("AUTH_ISSUER") {
            self.config.auth.issuer = Some(issuer);
        }
        if let Some(secret) = get_env_with_prefix("JWT_SECRET") {
            self.config.auth.jwt_secret = Some(secret);
        }
        if let Some(pem) = get_env_with_prefix("JWT_PUBLIC_KEY_PEM") {
            self.config.auth.jwt_public_key_pem = Some(pem);
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the log level is unknown
    /// - the database URL is empty or the pool bounds are inconsistent
    /// - the token audience is empty
    pub fn build(self) -> Result<Config, ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        if self.config.database.url.trim().is_empty() {
            return Err(ConfigError::invalid("database url is required"));
        }

        if self.config.database.max_connections == 0
            || self.config.database.min_connections > self.config.database.max_connections
        {
            return Err(ConfigError::invalid(
                "Database max_connections must be > 0 and >= min_connections",
            ));
        }

        if self.config.auth.audience.trim().is_empty() {
            return Err(ConfigError::invalid("auth audience is required"));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
