/*
 * Responsibility
 * - Load settings from the environment (JWKS, database, CORS, upload bucket)
 * - Validate them up front: a missing required key fails startup, not a request
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the bearer-token authorizer.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwks_url: Url,
    pub jwks_cache_ttl: Duration,
    pub jwks_timeout: Duration,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
}

/// Settings for attachment upload URLs.
///
/// Credentials are kept out of `Debug` output.
#[derive(Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    pub upload_url_expiration: Duration,
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("upload_url_expiration", &self.upload_url_expiration)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub auth: AuthConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let seconds_or = |key: &str, default: u64| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let port: u16 = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = required("DATABASE_URL")?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwks_url = Url::parse(required("JWKS_URL")?.trim())
            .map_err(|_| ConfigError::Invalid("JWKS_URL"))?;
        if !matches!(jwks_url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("JWKS_URL"));
        }

        let auth = AuthConfig {
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(seconds_or("JWKS_CACHE_TTL_SECONDS", 600)),
            jwks_timeout: Duration::from_secs(seconds_or("JWKS_TIMEOUT_SECONDS", 5).max(1)),
            issuer: lookup("AUTH_ISSUER").filter(|v| !v.trim().is_empty()),
            audience: lookup("AUTH_AUDIENCE").filter(|v| !v.trim().is_empty()),
            leeway_seconds: seconds_or("ACCESS_TOKEN_LEEWAY_SECONDS", 0),
        };

        let storage = StorageConfig {
            bucket: required("ATTACHMENTS_BUCKET")?,
            region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key_id: required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
            session_token: lookup("AWS_SESSION_TOKEN").filter(|v| !v.is_empty()),
            upload_url_expiration: Duration::from_secs(
                seconds_or("UPLOAD_URL_EXPIRATION_SECONDS", 300).clamp(1, 604_800),
            ),
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            auth,
            storage,
        })
    }
}
