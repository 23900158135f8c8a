use std::env;
use std::fmt;

use chrono::Duration;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

/// Ten years. Expiries must stay well inside what a timestamp can hold.
const MAX_ACCESS_TOKEN_EXPIRE_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub environment: DeploymentEnvironment,
    #[serde(default = "default_project_name")]
    pub project_name: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    Test,
    Dev,
    #[default]
    Prod,
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentEnvironment::Test => "test",
            DeploymentEnvironment::Dev => "dev",
            DeploymentEnvironment::Prod => "prod",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expire_seconds")]
    pub access_token_expire_seconds: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_expire_seconds", &self.access_token_expire_seconds)
            .finish()
    }
}

/// Account created with the `admin` attribute at startup if its name is free.
#[derive(Deserialize, Clone)]
pub struct BootstrapAdminConfig {
    pub name: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdminConfig")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    /// Lifetime of tokens minted without an explicit expiry.
    ///
    /// # Errors
    /// * `ConfigError::Message` - Lifetime not positive or above ten years
    pub fn access_token_ttl(&self) -> Result<Duration, ConfigError> {
        let seconds = self.access_token_expire_seconds;
        if !(1..=MAX_ACCESS_TOKEN_EXPIRE_SECONDS).contains(&seconds) {
            return Err(ConfigError::Message(format!(
                "jwt.access_token_expire_seconds must be between 1 and {}, got {}",
                MAX_ACCESS_TOKEN_EXPIRE_SECONDS, seconds
            )));
        }
        Duration::try_seconds(seconds).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.access_token_expire_seconds out of range: {}",
                seconds
            ))
        })
    }
}

fn default_project_name() -> String {
    "Pool Backend".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_access_token_expire_seconds() -> i64 {
    24 * 60 * 60 * 60
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{RUN_MODE}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings that are unsafe to run with in production.
    ///
    /// # Errors
    /// * `ConfigError::Message` - Secret too short or token lifetime out of range
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.access_token_ttl()?;

        if self.environment == DeploymentEnvironment::Prod
            && self.jwt.secret.len() < MIN_PRODUCTION_SECRET_BYTES
        {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes in prod",
                MIN_PRODUCTION_SECRET_BYTES
            )));
        }

        Ok(())
    }
}
