use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_SNAPSHOT_KEY: &str = "resume-builder:v1";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; a malformed value fails startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot store backend. In-memory when unset.
    pub redis_url: Option<String>,
    pub snapshot_key: String,
    pub autosave_debounce: Duration,
    /// Body limit for photo uploads, imports and render captures.
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: optional_env("REDIS_URL"),
            snapshot_key: optional_env("SNAPSHOT_KEY")
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_KEY.to_string()),
            autosave_debounce: Duration::from_millis(
                parse_env("AUTOSAVE_DEBOUNCE_MS", 500)
                    .context("AUTOSAVE_DEBOUNCE_MS must be a whole number of milliseconds")?,
            ),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            redis_url: None,
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            autosave_debounce: Duration::from_millis(500),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

/// Unset and blank both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
