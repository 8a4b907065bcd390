use std::str::FromStr;
use std::time::Duration;

use roster_db::{BootstrapPolicy, DbConfig};

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for a container next to a `db` service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins from comma-separated `CORS_ORIGIN`; `*` allows any.
    pub cors_origins: Vec<String>,
    /// Runtime mode label (default: `development`).
    pub app_env: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Delay of the synthetic latency endpoint (default: `2000`).
    pub heavy_task_delay_ms: u64,
    pub database: DbConfig,
    pub bootstrap: BootstrapPolicy,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                          | Default       |
    /// |----------------------------------|---------------|
    /// | `HOST`                           | `0.0.0.0`     |
    /// | `PORT`                           | `5000`        |
    /// | `CORS_ORIGIN`                    | `*`           |
    /// | `APP_ENV`                        | `development` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`          |
    /// | `HEAVY_TASK_DELAY_MS`            | `2000`        |
    /// | `DB_HOST`                        | `db`          |
    /// | `DB_PORT`                        | `3306`        |
    /// | `DB_USER`                        | `root`        |
    /// | `DB_PASSWORD`                    | unset         |
    /// | `DB_NAME`                        | `webapp`      |
    /// | `DB_POOL_SIZE`                   | `10`          |
    /// | `BOOTSTRAP_MAX_ATTEMPTS`         | `10`          |
    /// | `BOOTSTRAP_RETRY_DELAY_SECS`     | `5`           |
    /// | `BOOTSTRAP_ATTEMPT_TIMEOUT_SECS` | `10`          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let cors_origins: Vec<String> = text("CORS_ORIGIN", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let database = DbConfig {
            host: text("DB_HOST", "db"),
            port: parse(&lookup, "DB_PORT", 3306)?,
            user: text("DB_USER", "root"),
            password: lookup("DB_PASSWORD"),
            database: text("DB_NAME", "webapp"),
            pool_size: parse(&lookup, "DB_POOL_SIZE", 10)?,
        };

        let bootstrap = BootstrapPolicy {
            max_attempts: parse(&lookup, "BOOTSTRAP_MAX_ATTEMPTS", 10)?,
            retry_delay: Duration::from_secs(parse(&lookup, "BOOTSTRAP_RETRY_DELAY_SECS", 5)?),
            attempt_timeout: Duration::from_secs(parse(
                &lookup,
                "BOOTSTRAP_ATTEMPT_TIMEOUT_SECS",
                10,
            )?),
        };

        Ok(Self {
            host: text("HOST", "0.0.0.0"),
            port: parse(&lookup, "PORT", 5000)?,
            cors_origins,
            app_env: text("APP_ENV", "development"),
            request_timeout_secs: parse(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            heavy_task_delay_ms: parse(&lookup, "HEAVY_TASK_DELAY_MS", 2000)?,
            database,
            bootstrap,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Whether any origin may call the API.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}
