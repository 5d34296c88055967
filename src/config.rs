//! Server configuration read from the environment.
//!
//! `main` loads a `.env` file through `dotenvy` first, so every variable
//! below may also live there.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::types::errors::ConfigError;

pub const ENV_BIND: &str = "ORBITMARKS_BIND";
pub const ENV_DATA_DIR: &str = "ORBITMARKS_DATA_DIR";
pub const ENV_SESSION_TTL_HOURS: &str = "ORBITMARKS_SESSION_TTL_HOURS";
pub const ENV_SECURE_COOKIES: &str = "ORBITMARKS_SECURE_COOKIES";
pub const ENV_ALLOWED_ORIGIN: &str = "ORBITMARKS_ALLOWED_ORIGIN";

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 168;
pub const DATABASE_FILE: &str = "orbitmarks.db";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub session_ttl_secs: i64,
    pub secure_cookies: bool,
    /// Browser origin allowed to make credentialed cross-origin requests.
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            database_path: default_data_dir().join(DATABASE_FILE),
            session_ttl_secs: DEFAULT_SESSION_TTL_HOURS * 3600,
            secure_cookies: false,
            allowed_origin: None,
        }
    }
}

/// Directory of the running executable, or the working directory.
fn default_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("expected a boolean, got '{}'", other),
        )),
    }
}

impl ServerConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup. Unset keys keep
    /// their defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let bind = lookup(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        config.bind_addr = bind.trim().parse().map_err(|e| {
            ConfigError::InvalidValue(ENV_BIND.to_string(), format!("{}: {}", bind, e))
        })?;

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.database_path = PathBuf::from(dir.trim()).join(DATABASE_FILE);
        }

        if let Some(raw) = lookup(ENV_SESSION_TTL_HOURS) {
            let hours: i64 = raw.trim().parse().map_err(|e| {
                ConfigError::InvalidValue(ENV_SESSION_TTL_HOURS.to_string(), format!("{}: {}", raw, e))
            })?;
            if hours <= 0 {
                return Err(ConfigError::InvalidValue(
                    ENV_SESSION_TTL_HOURS.to_string(),
                    "must be a positive number of hours".to_string(),
                ));
            }
            config.session_ttl_secs = hours.saturating_mul(3600);
        }

        if let Some(raw) = lookup(ENV_SECURE_COOKIES) {
            config.secure_cookies = parse_bool(ENV_SECURE_COOKIES, &raw)?;
        }

        if let Some(origin) = lookup(ENV_ALLOWED_ORIGIN).filter(|o| !o.trim().is_empty()) {
            let origin = origin.trim().trim_end_matches('/').to_string();
            if !origin.starts_with("http://") && !origin.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    ENV_ALLOWED_ORIGIN.to_string(),
                    "must be an http(s) origin".to_string(),
                ));
            }
            config.allowed_origin = Some(origin);
        }

        Ok(config)
    }
}
