use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub lifecycle: LifecyclePolicy,
}

/// Knobs the lifecycle services read on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Fail `update_job` on an unknown status token instead of ignoring it.
    pub strict_job_status: bool,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        LifecyclePolicy {
            strict_job_status: false,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = LifecyclePolicy::default();
        let lifecycle = LifecyclePolicy {
            strict_job_status: optional_env("STRICT_JOB_STATUS")
                .map(|v| parse_flag(&v))
                .transpose()
                .context("STRICT_JOB_STATUS must be true/false")?
                .unwrap_or(defaults.strict_job_status),
            default_page_size: parse_env("JOBS_DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_env("JOBS_MAX_PAGE_SIZE", defaults.max_page_size)?,
        };
        if lifecycle.default_page_size == 0 || lifecycle.default_page_size > lifecycle.max_page_size {
            anyhow::bail!("JOBS_DEFAULT_PAGE_SIZE must be between 1 and JOBS_MAX_PAGE_SIZE");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            lifecycle,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}
