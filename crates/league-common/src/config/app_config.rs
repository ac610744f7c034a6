//! Application configuration
//!
//! Everything is read from environment variables, with a `.env` file loaded
//! first when present. Only the JWT secret is mandatory everywhere; the
//! database URL is mandatory when the Postgres backend is selected.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub storage: StorageConfig,
    pub database: Option<DatabaseConfig>,
    pub redis: Option<RedisConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub league: LeagueConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Where league state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidValue(
                "STORAGE_BACKEND",
                other.to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Game-level knobs
#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// Seconds between deadline sweeps; 0 disables the background task
    pub round_sweep_interval_secs: u64,
    /// Rounds advanced per sweep
    pub round_sweep_batch: i64,
    pub invite_code_length: usize,
    pub leaderboard_cache_ttl_secs: u64,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            round_sweep_interval_secs: default_sweep_interval(),
            round_sweep_batch: default_sweep_batch(),
            invite_code_length: default_invite_code_length(),
            leaderboard_cache_ttl_secs: default_cache_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "music-league".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    3600
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_sweep_batch() -> i64 {
    100
}

fn default_invite_code_length() -> usize {
    8
}

fn default_cache_ttl() -> u64 {
    300
}

/// Parse `key` if set, falling back to `default` when unset.
/// A value that is set but malformed is an error rather than a silent default.
fn parse_var<T: FromStr>(key: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        _ => Ok(default()),
    }
}

fn parse_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            "" => Ok(default),
            _ => Err(ConfigError::InvalidValue(key, raw)),
        },
        Err(_) => Ok(default),
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = StorageConfig {
            backend: parse_var("STORAGE_BACKEND", StorageBackend::default)?,
            run_migrations: parse_bool("DATABASE_RUN_MIGRATIONS", true)?,
        };

        let database = match optional_var("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                connect_timeout_secs: parse_var(
                    "DATABASE_CONNECT_TIMEOUT_SECS",
                    default_connect_timeout,
                )?,
            }),
            None if storage.backend == StorageBackend::Postgres => {
                return Err(ConfigError::MissingVar("DATABASE_URL"));
            }
            None => None,
        };

        let redis = match optional_var("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: parse_var(
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections,
                )?,
            }),
            None => None,
        };

        Ok(Self {
            app: AppSettings {
                name: optional_var("APP_NAME").unwrap_or_else(default_app_name),
                env: parse_var("APP_ENV", Environment::default)?,
            },
            api: ServerConfig {
                host: optional_var("API_HOST").unwrap_or_else(default_host),
                port: parse_var("API_PORT", default_port)?,
                request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", default_request_timeout)?,
            },
            storage,
            database,
            redis,
            jwt: JwtConfig {
                secret: optional_var("JWT_SECRET").ok_or(ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: parse_var(
                    "JWT_ACCESS_TOKEN_EXPIRY",
                    default_access_token_expiry,
                )?,
            },
            rate_limit: RateLimitConfig {
                enabled: parse_bool("RATE_LIMIT_ENABLED", true)?,
                requests_per_second: parse_var(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: parse_var("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: optional_var("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            league: LeagueConfig {
                round_sweep_interval_secs: parse_var(
                    "ROUND_SWEEP_INTERVAL_SECS",
                    default_sweep_interval,
                )?,
                round_sweep_batch: parse_var("ROUND_SWEEP_BATCH", default_sweep_batch)?,
                invite_code_length: parse_var("INVITE_CODE_LENGTH", default_invite_code_length)?,
                leaderboard_cache_ttl_secs: parse_var(
                    "LEADERBOARD_CACHE_TTL_SECS",
                    default_cache_ttl,
                )?,
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_var("WORKER_ID", || 0)?,
            },
        })
    }

    /// Single-process configuration over the memory backend, with the
    /// background sweep and rate limiting off
    ///
    /// Used by tests that start the server without touching the environment.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: Environment::default(),
            },
            api: ServerConfig {
                host: default_host(),
                port: 0,
                request_timeout_secs: default_request_timeout(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
                run_migrations: false,
            },
            database: None,
            redis: None,
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                access_token_expiry: default_access_token_expiry(),
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                requests_per_second: default_requests_per_second(),
                burst: default_burst(),
            },
            cors: CorsConfig::default(),
            league: LeagueConfig {
                round_sweep_interval_secs: 0,
                ..LeagueConfig::default()
            },
            snowflake: SnowflakeConfig { worker_id: 0 },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
