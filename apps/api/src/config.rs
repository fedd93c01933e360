use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::store::persistence::SNAPSHOT_KEY;

/// Where the persisted snapshot lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateBackend {
    File,
    Memory,
}

impl FromStr for StateBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StateBackend::File),
            "memory" => Ok(StateBackend::Memory),
            other => bail!("STATE_BACKEND must be 'file' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable is optional; startup fails only on unparseable values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub state_backend: StateBackend,
    pub state_path: PathBuf,
    pub export_dpi: f32,
    pub export_scale: f32,
    pub root_font_px: f32,
    /// Enables the model-backed assistant when set.
    pub anthropic_api_key: Option<String>,
    /// Overrides the Messages endpoint (proxies, gateways).
    pub anthropic_api_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            state_backend: parse_env("STATE_BACKEND", StateBackend::File)?,
            state_path: optional_env("STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_state_path),
            export_dpi: positive(parse_env("EXPORT_DPI", 96.0)?, "EXPORT_DPI")?,
            export_scale: positive(parse_env("EXPORT_SCALE", 2.0)?, "EXPORT_SCALE")?,
            root_font_px: positive(parse_env("ROOT_FONT_PX", 16.0)?, "ROOT_FONT_PX")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            anthropic_api_url: optional_env("ANTHROPIC_API_URL"),
        })
    }
}

/// `./data/<key>.json`, named after the snapshot's storage key.
fn default_state_path() -> PathBuf {
    PathBuf::from("./data").join(format!("{SNAPSHOT_KEY}.json"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
    }
}

fn positive(value: f32, key: &str) -> Result<f32> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        bail!("{key} must be a positive number")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_backend_parsing() {
        assert_eq!("memory".parse::<StateBackend>().unwrap(), StateBackend::Memory);
        assert_eq!(" FILE ".parse::<StateBackend>().unwrap(), StateBackend::File);
        assert!("redis".parse::<StateBackend>().is_err());
    }

    #[test]
    fn test_default_state_path() {
        assert_eq!(default_state_path(), PathBuf::from("./data/resumeState.json"));
    }

    #[test]
    fn test_positive_rejects_zero_and_nan() {
        assert!(positive(0.0, "X").is_err());
        assert!(positive(f32::NAN, "X").is_err());
        assert_eq!(positive(1.5, "X").unwrap(), 1.5);
    }
}
