//! Application configuration.
//!
//! All environment lookups happen here, once, at startup. Everything
//! downstream receives an [`AppConfig`] (or a piece of it) explicitly.

use chrono::Duration;

use solvehub_core::{Error, Result};

/// Default bearer-token lifetime: 7 days.
const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

/// Maximum upload size per file: 10 MB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Maximum files per upload request.
pub const MAX_UPLOAD_FILES: usize = 5;

/// Server configuration, collected from the environment at startup.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Secret for bearer-token signing. Required, no default.
    pub token_secret: String,
    pub token_ttl: Duration,
    /// Allowed CORS origins.
    pub allowed_origins: Vec<String>,
    /// Base directory for the filesystem storage backend.
    pub file_storage_path: String,
    /// Public URL under which stored files are served.
    pub public_files_url: String,
    /// Folder (key prefix) for uploaded objects.
    pub storage_folder: String,
    /// Optional HTTP object-storage endpoint; filesystem storage when unset.
    pub storage_endpoint: Option<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_period_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `TOKEN_SECRET` is mandatory; everything else has a development
    /// default.
    pub fn from_env() -> Result<Self> {
        let token_secret = std::env::var("TOKEN_SECRET")
            .map_err(|_| Error::Config("TOKEN_SECRET must be set".to_string()))?;

        let port = env_or("PORT", "3000")
            .parse()
            .map_err(|_| Error::Config("PORT must be a number".to_string()))?;

        let token_ttl_secs: i64 = env_or("TOKEN_TTL_SECS", &DEFAULT_TOKEN_TTL_SECS.to_string())
            .parse()
            .map_err(|_| Error::Config("TOKEN_TTL_SECS must be a number".to_string()))?;
        if token_ttl_secs <= 0 {
            return Err(Error::Config("TOKEN_TTL_SECS must be positive".to_string()));
        }

        let allowed_origins = env_or("ALLOWED_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        let rate_limit_enabled =
            matches!(env_or("RATE_LIMIT_ENABLED", "true").as_str(), "true" | "1");

        Ok(Self {
            database_url: env_or("DATABASE_URL", "postgres://localhost/solvehub"),
            host: env_or("HOST", "0.0.0.0"),
            port,
            token_secret,
            token_ttl: Duration::seconds(token_ttl_secs),
            allowed_origins,
            file_storage_path: env_or("FILE_STORAGE_PATH", "/var/lib/solvehub/files"),
            public_files_url: env_or("PUBLIC_FILES_URL", "http://localhost:3000/files"),
            storage_folder: env_or("STORAGE_FOLDER", "solvehub"),
            storage_endpoint: std::env::var("STORAGE_ENDPOINT").ok().filter(|s| !s.is_empty()),
            rate_limit_enabled,
            rate_limit_requests: env_or("RATE_LIMIT_REQUESTS", "100").parse().unwrap_or(100),
            rate_limit_period_secs: env_or("RATE_LIMIT_PERIOD_SECS", "60").parse().unwrap_or(60),
        })
    }
}
