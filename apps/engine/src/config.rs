use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::cache::DEFAULT_LAYOUT_CACHE_CAPACITY;
use crate::layout::FitTuning;
use crate::llm_client::DEFAULT_MODEL;

/// Application configuration loaded from environment variables.
/// Everything has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Absent → heuristic-only structure previews.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub layout_cache_capacity: usize,
    pub preview_cache_ttl: Duration,
    pub fit_tuning: FitTuning,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = FitTuning::default();
        Ok(Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            layout_cache_capacity: env_or("LAYOUT_CACHE_CAPACITY", DEFAULT_LAYOUT_CACHE_CAPACITY)?,
            preview_cache_ttl: Duration::from_secs(env_or("PREVIEW_CACHE_TTL_SECS", 900)?),
            fit_tuning: FitTuning {
                chars_per_unit: env_or("PAGE_FIT_CHARS_PER_UNIT", defaults.chars_per_unit)?,
                heading_units: env_or("PAGE_FIT_HEADING_UNITS", defaults.heading_units)?,
                ..defaults
            },
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset() {
        assert_eq!(parse_or::<u16>("PORT", None, 8080).unwrap(), 8080);
    }

    #[test]
    fn test_parse_or_parses_trimmed_value() {
        assert_eq!(parse_or::<usize>("CAP", Some(" 50 ".into()), 200).unwrap(), 50);
        assert_eq!(parse_or::<f32>("UNITS", Some("1.25".into()), 1.5).unwrap(), 1.25);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        let err = parse_or::<u16>("PORT", Some("eighty".into()), 8080).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
